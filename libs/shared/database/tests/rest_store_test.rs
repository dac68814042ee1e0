use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_database::{AppointmentStore, RestAppointmentStore};
use shared_models::appointment::{Document, DocumentType, PaymentReceipt, PaymentStatus, ResourceKind, UploaderRole};
use shared_utils::test_utils::TestConfig;

fn store_for(mock_server: &MockServer) -> RestAppointmentStore {
    let mut config = TestConfig::default().to_app_config();
    config.store_url = mock_server.uri();
    RestAppointmentStore::new(&config)
}

fn appointment_json(id: Uuid, patient_id: Uuid) -> serde_json::Value {
    json!({
        "id": id,
        "doctor_id": Uuid::new_v4(),
        "patient_id": patient_id,
        "doctor": { "full_name": "Dr. Meera Sharma" },
        "patient": { "full_name": "Ravi Kumar" },
        "date": "2026-01-15",
        "slot_start": "2026-01-15T09:00:00Z",
        "slot_end": "2026-01-15T09:30:00Z",
        "consultation_type": "video",
        "status": "scheduled",
        "symptoms": "fever",
        "documents": [
            {
                "appointment_id": id,
                "url": "https://cdn.example.com/doc.pdf",
                "storage_key": "1700000000-doc.pdf",
                "doc_type": "lab-report",
                "uploaded_by": "doctor",
                "resource_kind": "raw"
            }
        ],
        "consultation_fee": 500,
        "platform_fee": 50,
        "total_amount": 550,
        "payment_status": "pending",
        "created_at": "2026-01-01T00:00:00Z",
        "updated_at": "2026-01-01T00:00:00Z"
    })
}

#[tokio::test]
async fn find_appointment_returns_row_with_documents() {
    let mock_server = MockServer::start().await;
    let store = store_for(&mock_server);
    let id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([appointment_json(id, patient_id)])),
        )
        .mount(&mock_server)
        .await;

    let appointment = store
        .find_appointment(id, "token")
        .await
        .unwrap()
        .expect("appointment should exist");

    assert_eq!(appointment.id, id);
    assert_eq!(appointment.patient_id, patient_id);
    assert_eq!(appointment.payment_status, PaymentStatus::Pending);
    assert_eq!(appointment.documents.len(), 1);
    assert_eq!(appointment.documents[0].resource_kind, ResourceKind::Raw);
    assert_eq!(appointment.doctor.as_ref().unwrap().full_name, "Dr. Meera Sharma");
}

#[tokio::test]
async fn find_appointment_returns_none_for_empty_result() {
    let mock_server = MockServer::start().await;
    let store = store_for(&mock_server);

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let result = store.find_appointment(Uuid::new_v4(), "token").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn find_appointment_surfaces_store_errors() {
    let mock_server = MockServer::start().await;
    let store = store_for(&mock_server);

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let result = store.find_appointment(Uuid::new_v4(), "token").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn append_documents_inserts_rows() {
    let mock_server = MockServer::start().await;
    let store = store_for(&mock_server);
    let appointment_id = Uuid::new_v4();

    let documents = vec![Document {
        url: "https://cdn.example.com/scan.png".to_string(),
        storage_key: "1700000001-scan.png".to_string(),
        doc_type: DocumentType::Other,
        uploaded_by: UploaderRole::Doctor,
        resource_kind: ResourceKind::Image,
    }];

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointment_documents"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {
                "appointment_id": appointment_id,
                "url": "https://cdn.example.com/scan.png",
                "storage_key": "1700000001-scan.png",
                "doc_type": "other",
                "uploaded_by": "doctor",
                "resource_kind": "image"
            }
        ])))
        .mount(&mock_server)
        .await;

    let created = store
        .append_documents(appointment_id, &documents, "token")
        .await
        .unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].storage_key, "1700000001-scan.png");
}

#[tokio::test]
async fn append_documents_rejects_partial_insert() {
    let mock_server = MockServer::start().await;
    let store = store_for(&mock_server);

    let documents = vec![
        Document {
            url: "u1".to_string(),
            storage_key: "k1".to_string(),
            doc_type: DocumentType::Other,
            uploaded_by: UploaderRole::Doctor,
            resource_kind: ResourceKind::Image,
        },
        Document {
            url: "u2".to_string(),
            storage_key: "k2".to_string(),
            doc_type: DocumentType::Other,
            uploaded_by: UploaderRole::Doctor,
            resource_kind: ResourceKind::Image,
        },
    ];

    // Store answered with fewer rows than were sent.
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointment_documents"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {
                "url": "u1",
                "storage_key": "k1",
                "doc_type": "other",
                "uploaded_by": "doctor",
                "resource_kind": "image"
            }
        ])))
        .mount(&mock_server)
        .await;

    let result = store
        .append_documents(Uuid::new_v4(), &documents, "token")
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn remove_document_counts_deleted_rows() {
    let mock_server = MockServer::start().await;
    let store = store_for(&mock_server);
    let appointment_id = Uuid::new_v4();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/appointment_documents"))
        .and(query_param("appointment_id", format!("eq.{}", appointment_id)))
        .and(query_param("storage_key", "eq.k1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "storage_key": "k1" }
        ])))
        .mount(&mock_server)
        .await;

    let removed = store
        .remove_document(appointment_id, "k1", "token")
        .await
        .unwrap();
    assert_eq!(removed, 1);
}

#[tokio::test]
async fn remove_document_reports_zero_for_absent_key() {
    let mock_server = MockServer::start().await;
    let store = store_for(&mock_server);

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/appointment_documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let removed = store
        .remove_document(Uuid::new_v4(), "missing", "token")
        .await
        .unwrap();
    assert_eq!(removed, 0);
}

#[tokio::test]
async fn mark_paid_patches_payment_fields() {
    let mock_server = MockServer::start().await;
    let store = store_for(&mock_server);
    let id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();

    let mut paid = appointment_json(id, patient_id);
    paid["payment_status"] = json!("paid");
    paid["razorpay_order_id"] = json!("order_123");
    paid["razorpay_payment_id"] = json!("pay_456");

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([paid])))
        .mount(&mock_server)
        .await;

    let receipt = PaymentReceipt {
        order_id: "order_123".to_string(),
        payment_id: "pay_456".to_string(),
        signature: "ab12".to_string(),
        paid_at: Utc::now(),
    };

    let updated = store.mark_paid(id, &receipt, "token").await.unwrap();
    assert_eq!(updated.payment_status, PaymentStatus::Paid);
    assert_eq!(updated.razorpay_order_id.as_deref(), Some("order_123"));
}

#[tokio::test]
async fn mark_paid_fails_when_no_row_updated() {
    let mock_server = MockServer::start().await;
    let store = store_for(&mock_server);

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let receipt = PaymentReceipt {
        order_id: "order_123".to_string(),
        payment_id: "pay_456".to_string(),
        signature: "ab12".to_string(),
        paid_at: Utc::now(),
    };

    let result = store.mark_paid(Uuid::new_v4(), &receipt, "token").await;
    assert!(result.is_err());
}
