//! Common test fixtures: BPMN documents and an API contract.
use kensa::prelude::*;
use std::path::{Path, PathBuf};

/// An online-banking process with a collaboration, DI shapes, lanes,
/// a conditional branch and an error boundary.
///
/// Tasks naming HTTP calls:
/// - `Task_Login`    POST /auth/login                      (in contract)
/// - `Task_Balance`  GET /accounts/{accountId}/balances    (in contract)
/// - `Task_Transfer` POST /payments                        (in contract)
/// - `Task_Token`    POST /auth/bank-token                 (not in contract)
#[allow(dead_code)]
pub const BANKING_BPMN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL"
                  xmlns:bpmndi="http://www.omg.org/spec/BPMN/20100524/DI"
                  xmlns:dc="http://www.omg.org/spec/DD/20100524/DC"
                  id="Definitions_1">
  <bpmn:collaboration id="Collaboration_1">
    <bpmn:participant id="Participant_Bank" name="Bank" processRef="BankingProcess" />
    <bpmn:participant id="Participant_Customer" name="Customer" />
    <bpmn:messageFlow id="MessageFlow_1" name="Receipt" sourceRef="Task_Notify" targetRef="Participant_Customer" />
  </bpmn:collaboration>
  <bpmn:process id="BankingProcess" name="Online Banking" isExecutable="true">
    <bpmn:laneSet id="LaneSet_1">
      <bpmn:lane id="Lane_Customer" name="Customer">
        <bpmn:flowNodeRef>StartEvent_1</bpmn:flowNodeRef>
        <bpmn:flowNodeRef>Task_Login</bpmn:flowNodeRef>
      </bpmn:lane>
      <bpmn:lane id="Lane_Core" name="Core Banking">
        <bpmn:flowNodeRef>Task_Balance</bpmn:flowNodeRef>
        <bpmn:flowNodeRef>Task_Transfer</bpmn:flowNodeRef>
      </bpmn:lane>
    </bpmn:laneSet>
    <bpmn:startEvent id="StartEvent_1" name="Customer opens app">
      <bpmn:outgoing>Flow_1</bpmn:outgoing>
    </bpmn:startEvent>
    <bpmn:userTask id="Task_Login" name="Login via POST /auth/login">
      <bpmn:incoming>Flow_1</bpmn:incoming>
      <bpmn:outgoing>Flow_2</bpmn:outgoing>
    </bpmn:userTask>
    <bpmn:serviceTask id="Task_Balance" name="GET /accounts/{accountId}/balances" />
    <bpmn:exclusiveGateway id="Gateway_1" name="Sufficient funds?" />
    <bpmn:userTask id="Task_Transfer" name="Transfer funds via POST /payments" />
    <bpmn:serviceTask id="Task_Notify" name="Send notification" />
    <bpmn:task id="Task_Token" name="POST /auth/bank-token" />
    <bpmn:task id="Task_Error" name="Handle payment error" />
    <bpmn:boundaryEvent id="Boundary_Err" name="Payment failed" attachedToRef="Task_Transfer">
      <bpmn:errorEventDefinition id="ErrorDef_1" />
    </bpmn:boundaryEvent>
    <bpmn:endEvent id="EndEvent_1" name="Done" />
    <bpmn:dataObjectReference id="DataRef_1" name="Payment order" dataObjectRef="DataObject_1" />
    <bpmn:dataObject id="DataObject_1" isCollection="false" />
    <bpmn:sequenceFlow id="Flow_1" sourceRef="StartEvent_1" targetRef="Task_Login" />
    <bpmn:sequenceFlow id="Flow_2" sourceRef="Task_Login" targetRef="Task_Balance" />
    <bpmn:sequenceFlow id="Flow_3" sourceRef="Task_Balance" targetRef="Gateway_1" />
    <bpmn:sequenceFlow id="Flow_4" name="yes" sourceRef="Gateway_1" targetRef="Task_Transfer">
      <bpmn:conditionExpression>${balance &gt;= amount}</bpmn:conditionExpression>
    </bpmn:sequenceFlow>
    <bpmn:sequenceFlow id="Flow_5" name="no" sourceRef="Gateway_1" targetRef="Task_Notify" />
    <bpmn:sequenceFlow id="Flow_6" sourceRef="Task_Transfer" targetRef="Task_Notify" />
    <bpmn:sequenceFlow id="Flow_7" sourceRef="Task_Notify" targetRef="EndEvent_1" />
    <bpmn:sequenceFlow id="Flow_8" sourceRef="Boundary_Err" targetRef="Task_Error" />
    <bpmn:sequenceFlow id="Flow_9" sourceRef="Task_Error" targetRef="EndEvent_1" />
  </bpmn:process>
  <bpmndi:BPMNDiagram id="Diagram_1">
    <bpmndi:BPMNPlane id="Plane_1" bpmnElement="Collaboration_1">
      <bpmndi:BPMNShape id="Shape_Login" bpmnElement="Task_Login">
        <dc:Bounds x="250" y="80" width="100" height="80" />
      </bpmndi:BPMNShape>
      <bpmndi:BPMNShape id="Shape_Balance" bpmnElement="Task_Balance">
        <dc:Bounds x="400" y="80" width="100" height="80" />
      </bpmndi:BPMNShape>
      <bpmndi:BPMNShape id="Shape_NoBounds" bpmnElement="Task_Transfer" />
    </bpmndi:BPMNPlane>
  </bpmndi:BPMNDiagram>
</bpmn:definitions>
"#;

/// Contract backing three of the banking tasks plus one unused template.
#[allow(dead_code)]
pub const BANKING_CONTRACT: &str = r#"{
  "openapi": "3.0.0",
  "paths": {
    "/auth/login": {
      "post": {
        "description": "Authenticate a customer",
        "requestBody": {
          "content": {
            "application/json": {
              "schema": {
                "type": "object",
                "properties": {
                  "username": {"type": "string"},
                  "password": {"type": "string"}
                }
              }
            }
          }
        }
      }
    },
    "/accounts/{accountId}/balances": {
      "parameters": [{"name": "ignored", "in": "header"}],
      "get": {
        "description": "Read account balances",
        "parameters": [{"name": "accountId", "in": "path", "required": true}]
      }
    },
    "/payments": {
      "post": {
        "description": "Initiate a payment",
        "requestBody": {
          "content": {
            "application/json": {
              "schema": {
                "type": "object",
                "properties": {
                  "amount": {"type": "number"},
                  "creditorIban": {"type": "string"},
                  "instant": {"type": "boolean"}
                }
              }
            }
          }
        }
      }
    },
    "/customers/{customerId}/profile": {
      "get": {"description": "Read a customer profile"}
    }
  }
}"#;

/// Builds a process document with one task per `(id, name)` pair, chained in order.
#[allow(dead_code)]
pub fn linear_process(process_id: &str, tasks: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (id, name) in tasks {
        body.push_str(&format!(r#"<task id="{}" name="{}" />"#, id, name));
    }
    for (i, pair) in tasks.windows(2).enumerate() {
        body.push_str(&format!(
            r#"<sequenceFlow id="f{}" sourceRef="{}" targetRef="{}" />"#,
            i, pair[0].0, pair[1].0
        ));
    }
    format!(
        r#"<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL"><process id="{}">{}</process></definitions>"#,
        process_id, body
    )
}

/// A contract declaring the given `(template, verb)` pairs with empty operations.
#[allow(dead_code)]
pub fn contract_with(operations: &[(&str, &str)]) -> ApiContract {
    let mut paths = serde_json::Map::new();
    for (template, verb) in operations {
        let entry = paths
            .entry(template.to_string())
            .or_insert_with(|| serde_json::json!({}));
        entry[*verb] = serde_json::json!({ "description": format!("{} {}", verb, template) });
    }
    let document = serde_json::json!({ "paths": paths });
    ApiContract::from_json_str(&document.to_string()).expect("fixture contract is valid")
}

#[allow(dead_code)]
pub fn banking_contract() -> ApiContract {
    ApiContract::from_json_str(BANKING_CONTRACT).expect("fixture contract is valid")
}

#[allow(dead_code)]
pub fn banking_analyzer() -> Analyzer {
    Analyzer::builder(banking_contract()).build()
}

#[allow(dead_code)]
pub fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("fixture file can be written");
    path
}
