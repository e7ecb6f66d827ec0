#[cfg(test)]
pub mod test_utils {
    use std::sync::Arc;

    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;
    use serde_json::Value;

    use crate::handlers;
    use crate::init_rocket;
    use crate::store::schema::{ACTIVITIES, USERS};
    use crate::store::{MemoryTransport, RowStore};

    pub static STANDARD_PASSWORD: &str = "password123";

    pub struct TestStudent {
        pub id: String,
        pub username: String,
        pub display_name: String,
    }

    pub struct TestActivity {
        pub id: String,
        pub date: String,
        pub title_he: String,
    }

    /// Seeds a fresh in-memory workbook with fixed-id rows. The bootstrap
    /// admin and the skill catalogs are always present after `build`.
    #[derive(Default)]
    pub struct TestWorkbookBuilder {
        students: Vec<TestStudent>,
        activities: Vec<TestActivity>,
    }

    impl TestWorkbookBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn student(mut self, id: &str, username: &str) -> Self {
            self.students.push(TestStudent {
                id: id.to_string(),
                username: username.to_string(),
                display_name: username.to_string(),
            });
            self
        }

        pub fn activity(mut self, id: &str, date: &str, title_he: &str) -> Self {
            self.activities.push(TestActivity {
                id: id.to_string(),
                date: date.to_string(),
                title_he: title_he.to_string(),
            });
            self
        }

        pub async fn build(self) -> TestWorkbook {
            let transport = Arc::new(MemoryTransport::new());
            let store = RowStore::unthrottled(transport.clone());

            handlers::ensure_workbook(&store)
                .await
                .expect("workbook bootstrap failed");

            for student in &self.students {
                store
                    .append_row(
                        &USERS,
                        vec![
                            student.id.clone(),
                            student.username.clone(),
                            STANDARD_PASSWORD.to_string(),
                            "student".to_string(),
                            student.display_name.clone(),
                            "active".to_string(),
                        ],
                    )
                    .await
                    .expect("failed to seed student");
            }

            for activity in &self.activities {
                store
                    .append_row(
                        &ACTIVITIES,
                        vec![
                            activity.id.clone(),
                            activity.date.clone(),
                            activity.title_he.clone(),
                            String::new(),
                            String::new(),
                            String::new(),
                        ],
                    )
                    .await
                    .expect("failed to seed activity");
            }

            TestWorkbook { store, transport }
        }
    }

    pub struct TestWorkbook {
        pub store: RowStore,
        pub transport: Arc<MemoryTransport>,
    }

    pub async fn create_standard_workbook() -> TestWorkbook {
        TestWorkbookBuilder::new()
            .student("ST-100", "dana")
            .student("ST-101", "noam")
            .activity("ACT-100", "2025-03-10", "סדנת בישול")
            .build()
            .await
    }

    pub async fn setup_test_client(workbook: TestWorkbook) -> (Client, Arc<MemoryTransport>) {
        let client = Client::tracked(init_rocket(workbook.store).await)
            .await
            .expect("valid rocket instance");
        (client, workbook.transport)
    }

    /// Post one action body and decode the 200 envelope.
    pub async fn post_action(client: &Client, body: Value) -> Value {
        let response = client
            .post("/api/sheets")
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.expect("response body");
        serde_json::from_str(&body).expect("response is JSON")
    }
}
