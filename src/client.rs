//! A typed client for the action endpoint. Every call posts one JSON body to
//! `/api/sheets` with an `action` field and decodes the matching envelope.

#![allow(dead_code)]

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;

use crate::api::{
    ActivitiesResponse, ActivityMetricsResponse, AssessmentResponse, CreatedResponse,
    LoginResponse, MutationResponse, SkillMetricsResponse, SkillsResponse,
    StudentSkillsResponse, StudentsResponse, TasksResponse, TemplatesResponse,
};
use crate::models::{
    Activity, ActivityMetric, AssessmentValue, MetricMark, PlanTask, PlanTemplate, Skill,
    SkillMetric, StudentSkill, User,
};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error: HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("{0}")]
    Domain(String),

    #[error("Unexpected response: {0}")]
    BadResponse(String),
}

pub struct PlanApiClient {
    http: Client,
    base_url: String,
}

impl PlanApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn call<T: DeserializeOwned>(&self, body: Value) -> Result<T, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/sheets", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let value: Value = response.json().await?;
        if let Some(message) = value.get("error").and_then(Value::as_str) {
            return Err(ClientError::Domain(message.to_string()));
        }
        serde_json::from_value(value).map_err(|e| ClientError::BadResponse(e.to_string()))
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User, ClientError> {
        let response: LoginResponse = self
            .call(json!({
                "action": "login",
                "username": username,
                "password": password,
            }))
            .await?;
        response
            .user
            .ok_or_else(|| ClientError::BadResponse("login response without user".to_string()))
    }

    pub async fn get_students(&self) -> Result<Vec<User>, ClientError> {
        let response: StudentsResponse = self.call(json!({ "action": "getStudents" })).await?;
        Ok(response.students)
    }

    pub async fn add_student(
        &self,
        username: &str,
        password: &str,
        display_name: &str,
    ) -> Result<String, ClientError> {
        let response: CreatedResponse = self
            .call(json!({
                "action": "addStudent",
                "username": username,
                "password": password,
                "displayName": display_name,
            }))
            .await?;
        response
            .id
            .ok_or_else(|| ClientError::BadResponse("create response without id".to_string()))
    }

    pub async fn update_student_password(
        &self,
        student_id: &str,
        new_password: &str,
    ) -> Result<(), ClientError> {
        let _: MutationResponse = self
            .call(json!({
                "action": "updateStudentPassword",
                "studentId": student_id,
                "newPassword": new_password,
            }))
            .await?;
        Ok(())
    }

    pub async fn update_student_status(
        &self,
        student_id: &str,
        status: &str,
    ) -> Result<(), ClientError> {
        let _: MutationResponse = self
            .call(json!({
                "action": "updateStudentStatus",
                "studentId": student_id,
                "status": status,
            }))
            .await?;
        Ok(())
    }

    pub async fn get_skills(&self) -> Result<Vec<Skill>, ClientError> {
        let response: SkillsResponse = self.call(json!({ "action": "getSkills" })).await?;
        Ok(response.skills)
    }

    pub async fn get_student_skills(
        &self,
        student_id: &str,
    ) -> Result<Vec<StudentSkill>, ClientError> {
        let response: StudentSkillsResponse = self
            .call(json!({ "action": "getStudentSkills", "studentId": student_id }))
            .await?;
        Ok(response.skills)
    }

    pub async fn get_skill_metrics(
        &self,
        skill_id: &str,
    ) -> Result<Vec<SkillMetric>, ClientError> {
        let response: SkillMetricsResponse = self
            .call(json!({ "action": "getSkillMetrics", "skillId": skill_id }))
            .await?;
        Ok(response.metrics)
    }

    pub async fn save_self_assessment(
        &self,
        student_id: &str,
        skill_id: &str,
        metrics: &[MetricMark],
    ) -> Result<(), ClientError> {
        let _: MutationResponse = self
            .call(json!({
                "action": "saveSelfAssessment",
                "studentId": student_id,
                "skillId": skill_id,
                "metrics": metrics,
            }))
            .await?;
        Ok(())
    }

    pub async fn get_personal_plan_tasks(
        &self,
        student_id: &str,
        date: &str,
    ) -> Result<Vec<PlanTask>, ClientError> {
        let response: TasksResponse = self
            .call(json!({
                "action": "getPersonalPlanTasks",
                "studentId": student_id,
                "date": date,
            }))
            .await?;
        Ok(response.tasks)
    }

    pub async fn set_task_completed(
        &self,
        student_id: &str,
        task_id: &str,
        date: &str,
        completed: bool,
    ) -> Result<(), ClientError> {
        let _: MutationResponse = self
            .call(json!({
                "action": "setTaskCompleted",
                "studentId": student_id,
                "taskId": task_id,
                "date": date,
                "completed": completed,
            }))
            .await?;
        Ok(())
    }

    pub async fn get_activities_for_date(
        &self,
        student_id: &str,
        date: &str,
    ) -> Result<Vec<Activity>, ClientError> {
        let response: ActivitiesResponse = self
            .call(json!({
                "action": "getActivitiesForDate",
                "studentId": student_id,
                "date": date,
            }))
            .await?;
        Ok(response.activities)
    }

    pub async fn get_activities_for_date_range(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<Activity>, ClientError> {
        let response: ActivitiesResponse = self
            .call(json!({
                "action": "getActivitiesForDateRange",
                "startDate": start_date,
                "endDate": end_date,
            }))
            .await?;
        Ok(response.activities)
    }

    pub async fn add_activity(
        &self,
        date: &str,
        title_he: &str,
        description_he: Option<&str>,
        time_start: Option<&str>,
        time_end: Option<&str>,
    ) -> Result<String, ClientError> {
        let response: CreatedResponse = self
            .call(json!({
                "action": "addActivity",
                "date": date,
                "titleHe": title_he,
                "descriptionHe": description_he,
                "timeStart": time_start,
                "timeEnd": time_end,
            }))
            .await?;
        response
            .id
            .ok_or_else(|| ClientError::BadResponse("create response without id".to_string()))
    }

    pub async fn update_activity(
        &self,
        activity_id: &str,
        patch: Value,
    ) -> Result<(), ClientError> {
        let mut body = json!({
            "action": "updateActivity",
            "activityId": activity_id,
        });
        if let (Some(body_map), Some(patch_map)) = (body.as_object_mut(), patch.as_object()) {
            for (key, value) in patch_map {
                body_map.insert(key.clone(), value.clone());
            }
        }
        let _: MutationResponse = self.call(body).await?;
        Ok(())
    }

    pub async fn delete_activity(&self, activity_id: &str) -> Result<(), ClientError> {
        let _: MutationResponse = self
            .call(json!({ "action": "deleteActivity", "activityId": activity_id }))
            .await?;
        Ok(())
    }

    pub async fn set_activity_completed(
        &self,
        student_id: &str,
        activity_id: &str,
        completed: bool,
    ) -> Result<(), ClientError> {
        let _: MutationResponse = self
            .call(json!({
                "action": "setActivityCompleted",
                "studentId": student_id,
                "activityId": activity_id,
                "completed": completed,
            }))
            .await?;
        Ok(())
    }

    pub async fn get_activity_metrics(
        &self,
        activity_id: &str,
    ) -> Result<Vec<ActivityMetric>, ClientError> {
        let response: ActivityMetricsResponse = self
            .call(json!({ "action": "getActivityMetrics", "activityId": activity_id }))
            .await?;
        Ok(response.metrics)
    }

    pub async fn get_activity_assessment(
        &self,
        student_id: &str,
        activity_id: &str,
    ) -> Result<Vec<AssessmentValue>, ClientError> {
        let response: AssessmentResponse = self
            .call(json!({
                "action": "getActivityAssessment",
                "studentId": student_id,
                "activityId": activity_id,
            }))
            .await?;
        Ok(response.values)
    }

    pub async fn save_activity_assessment(
        &self,
        student_id: &str,
        activity_id: &str,
        metrics: &[MetricMark],
    ) -> Result<(), ClientError> {
        let _: MutationResponse = self
            .call(json!({
                "action": "saveActivityAssessment",
                "studentId": student_id,
                "activityId": activity_id,
                "metrics": metrics,
            }))
            .await?;
        Ok(())
    }

    pub async fn get_personal_plan_templates(&self) -> Result<Vec<PlanTemplate>, ClientError> {
        let response: TemplatesResponse = self
            .call(json!({ "action": "getPersonalPlanTemplates" }))
            .await?;
        Ok(response.tasks)
    }

    #[cfg(test)]
    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn assign_tasks_to_student(
        &self,
        student_id: &str,
        date: &str,
        task_ids: &[String],
    ) -> Result<(), ClientError> {
        let _: MutationResponse = self
            .call(json!({
                "action": "assignTasksToStudent",
                "studentId": student_id,
                "date": date,
                "taskIds": task_ids,
            }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// One-shot HTTP stub: answers the next connection with a canned response
    /// and returns the base URL to point the client at.
    async fn spawn_stub(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
        });
        format!("http://{}", addr)
    }

    #[test]
    fn base_url_is_normalized() {
        let client = PlanApiClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn typed_responses_decode() {
        let base = spawn_stub("200 OK", r#"{"students":[]}"#).await;
        let client = PlanApiClient::new(&base);
        assert!(client.get_students().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn envelope_errors_surface_as_domain_failures() {
        let base = spawn_stub("200 OK", r#"{"error":"Unknown action: frobnicate"}"#).await;
        let client = PlanApiClient::new(&base);
        match client.get_students().await {
            Err(ClientError::Domain(msg)) => assert_eq!(msg, "Unknown action: frobnicate"),
            other => panic!("expected a domain error, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn non_success_statuses_become_server_errors() {
        let base = spawn_stub("502 Bad Gateway", "upstream exploded").await;
        let client = PlanApiClient::new(&base);
        match client.get_students().await {
            Err(ClientError::Server { status, message }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("expected a server error, got {:?}", other.err()),
        }
    }
}
