use rocket::State;
use rocket::serde::{Deserialize, Serialize, json::Json};
use serde_json::{Value, json};
use tracing::info;
use validator::Validate;

use crate::error::AppError;
use crate::handlers;
use crate::handlers::{ActivityPatch, NewActivity};
use crate::models::{
    Activity, ActivityMetric, AssessmentValue, MetricMark, PlanTask, PlanTemplate, Skill,
    SkillMetric, StudentSkill, User,
};
use crate::store::RowStore;
use crate::validation::ValidateParams;

#[derive(Deserialize, Validate)]
pub struct LoginParams {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddStudentParams {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentPasswordParams {
    pub student_id: String,
    #[validate(length(min = 1, message = "newPassword is required"))]
    pub new_password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentStatusParams {
    pub student_id: String,
    pub status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentParams {
    pub student_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillParams {
    pub skill_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSelfAssessmentParams {
    pub student_id: String,
    pub skill_id: String,
    pub metrics: Vec<MetricMark>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDateParams {
    pub student_id: String,
    pub date: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTaskCompletedParams {
    pub student_id: String,
    pub task_id: String,
    pub date: String,
    pub completed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeParams {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddActivityParams {
    #[validate(length(min = 1, message = "date is required"))]
    pub date: String,
    #[validate(length(min = 1, message = "titleHe is required"))]
    pub title_he: String,
    pub description_he: Option<String>,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActivityParams {
    pub activity_id: String,
    pub date: Option<String>,
    pub title_he: Option<String>,
    pub description_he: Option<String>,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityParams {
    pub activity_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActivityCompletedParams {
    pub student_id: String,
    pub activity_id: String,
    pub completed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentActivityParams {
    pub student_id: String,
    pub activity_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveActivityAssessmentParams {
    pub student_id: String,
    pub activity_id: String,
    pub metrics: Vec<MetricMark>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTasksParams {
    pub student_id: String,
    pub date: String,
    pub task_ids: Vec<String>,
}

/// The dispatch table: one variant per domain action, tagged by the wire
/// `action` string.
#[derive(Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ActionRequest {
    Login(LoginParams),
    GetStudents,
    AddStudent(AddStudentParams),
    UpdateStudentPassword(UpdateStudentPasswordParams),
    UpdateStudentStatus(UpdateStudentStatusParams),
    GetSkills,
    GetStudentSkills(StudentParams),
    GetSkillMetrics(SkillParams),
    SaveSelfAssessment(SaveSelfAssessmentParams),
    GetPersonalPlanTasks(StudentDateParams),
    SetTaskCompleted(SetTaskCompletedParams),
    GetActivitiesForDate(StudentDateParams),
    GetActivitiesForDateRange(DateRangeParams),
    AddActivity(AddActivityParams),
    UpdateActivity(UpdateActivityParams),
    DeleteActivity(ActivityParams),
    SetActivityCompleted(SetActivityCompletedParams),
    GetActivityMetrics(ActivityParams),
    GetActivityAssessment(StudentActivityParams),
    SaveActivityAssessment(SaveActivityAssessmentParams),
    GetPersonalPlanTemplates,
    AssignTasksToStudent(AssignTasksParams),
}

const KNOWN_ACTIONS: &[&str] = &[
    "login",
    "getStudents",
    "addStudent",
    "updateStudentPassword",
    "updateStudentStatus",
    "getSkills",
    "getStudentSkills",
    "getSkillMetrics",
    "saveSelfAssessment",
    "getPersonalPlanTasks",
    "setTaskCompleted",
    "getActivitiesForDate",
    "getActivitiesForDateRange",
    "addActivity",
    "updateActivity",
    "deleteActivity",
    "setActivityCompleted",
    "getActivityMetrics",
    "getActivityAssessment",
    "saveActivityAssessment",
    "getPersonalPlanTemplates",
    "assignTasksToStudent",
];

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MutationResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreatedResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct StudentsResponse {
    pub students: Vec<User>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SkillsResponse {
    pub skills: Vec<Skill>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct StudentSkillsResponse {
    pub skills: Vec<StudentSkill>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SkillMetricsResponse {
    pub metrics: Vec<SkillMetric>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TasksResponse {
    pub tasks: Vec<PlanTask>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TemplatesResponse {
    pub tasks: Vec<PlanTemplate>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ActivitiesResponse {
    pub activities: Vec<Activity>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ActivityMetricsResponse {
    pub metrics: Vec<ActivityMetric>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AssessmentResponse {
    pub values: Vec<AssessmentValue>,
}

/// The single action endpoint. Domain failures stay inside the 200 envelope;
/// configuration and upstream failures escape through `AppError` to real
/// HTTP statuses (500/502).
#[post("/sheets", data = "<body>")]
pub async fn api_dispatch(
    body: Json<Value>,
    store: &State<RowStore>,
) -> Result<Json<Value>, AppError> {
    let value = body.into_inner();

    let action = match value.get("action").and_then(Value::as_str) {
        Some(action) => action.to_string(),
        None => return Ok(Json(json!({ "error": "Missing action" }))),
    };
    if !KNOWN_ACTIONS.contains(&action.as_str()) {
        return Ok(Json(json!({ "error": format!("Unknown action: {}", action) })));
    }
    info!(action = %action, "Dispatching action");

    handlers::ensure_workbook(store).await?;

    let request: ActionRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(err) => {
            return Ok(Json(
                json!({ "success": false, "error": format!("Bad parameters: {}", err) }),
            ));
        }
    };

    match dispatch(store, request).await {
        Ok(result) => Ok(Json(result)),
        Err(err) if err.is_domain() => {
            err.log_and_record(&format!("Action {}", action));
            Ok(Json(
                json!({ "success": false, "error": err.domain_message() }),
            ))
        }
        Err(err) => Err(err),
    }
}

async fn dispatch(store: &RowStore, request: ActionRequest) -> Result<Value, AppError> {
    let result = match request {
        ActionRequest::Login(p) => {
            let user = handlers::login(store, &p.username, &p.password).await?;
            serde_json::to_value(LoginResponse {
                success: true,
                user: Some(user),
                error: None,
            })?
        }
        ActionRequest::GetStudents => {
            let students = handlers::get_students(store).await?;
            serde_json::to_value(StudentsResponse { students })?
        }
        ActionRequest::AddStudent(p) => {
            p.check()?;
            let id = handlers::add_student(store, &p.username, &p.password, &p.display_name)
                .await?;
            serde_json::to_value(CreatedResponse {
                success: true,
                id: Some(id),
                error: None,
            })?
        }
        ActionRequest::UpdateStudentPassword(p) => {
            p.check()?;
            handlers::update_student_password(store, &p.student_id, &p.new_password).await?;
            serde_json::to_value(MutationResponse::ok())?
        }
        ActionRequest::UpdateStudentStatus(p) => {
            handlers::update_student_status(store, &p.student_id, &p.status).await?;
            serde_json::to_value(MutationResponse::ok())?
        }
        ActionRequest::GetSkills => {
            let skills = handlers::get_skills(store).await?;
            serde_json::to_value(SkillsResponse { skills })?
        }
        ActionRequest::GetStudentSkills(p) => {
            let skills = handlers::get_student_skills(store, &p.student_id).await?;
            serde_json::to_value(StudentSkillsResponse { skills })?
        }
        ActionRequest::GetSkillMetrics(p) => {
            let metrics = handlers::get_skill_metrics(store, &p.skill_id).await?;
            serde_json::to_value(SkillMetricsResponse { metrics })?
        }
        ActionRequest::SaveSelfAssessment(p) => {
            handlers::save_self_assessment(store, &p.student_id, &p.skill_id, &p.metrics)
                .await?;
            serde_json::to_value(MutationResponse::ok())?
        }
        ActionRequest::GetPersonalPlanTasks(p) => {
            let tasks = handlers::get_personal_plan_tasks(store, &p.student_id, &p.date).await?;
            serde_json::to_value(TasksResponse { tasks })?
        }
        ActionRequest::SetTaskCompleted(p) => {
            handlers::set_task_completed(store, &p.student_id, &p.task_id, &p.date, p.completed)
                .await?;
            serde_json::to_value(MutationResponse::ok())?
        }
        ActionRequest::GetActivitiesForDate(p) => {
            let activities =
                handlers::get_activities_for_date(store, &p.student_id, &p.date).await?;
            serde_json::to_value(ActivitiesResponse { activities })?
        }
        ActionRequest::GetActivitiesForDateRange(p) => {
            let activities =
                handlers::get_activities_for_date_range(store, &p.start_date, &p.end_date)
                    .await?;
            serde_json::to_value(ActivitiesResponse { activities })?
        }
        ActionRequest::AddActivity(p) => {
            p.check()?;
            let id = handlers::add_activity(
                store,
                NewActivity {
                    date: p.date,
                    title_he: p.title_he,
                    description_he: p.description_he,
                    time_start: p.time_start,
                    time_end: p.time_end,
                },
            )
            .await?;
            serde_json::to_value(CreatedResponse {
                success: true,
                id: Some(id),
                error: None,
            })?
        }
        ActionRequest::UpdateActivity(p) => {
            handlers::update_activity(
                store,
                &p.activity_id,
                ActivityPatch {
                    date: p.date,
                    title_he: p.title_he,
                    description_he: p.description_he,
                    time_start: p.time_start,
                    time_end: p.time_end,
                },
            )
            .await?;
            serde_json::to_value(MutationResponse::ok())?
        }
        ActionRequest::DeleteActivity(p) => {
            handlers::delete_activity(store, &p.activity_id).await?;
            serde_json::to_value(MutationResponse::ok())?
        }
        ActionRequest::SetActivityCompleted(p) => {
            handlers::set_activity_completed(store, &p.student_id, &p.activity_id, p.completed)
                .await?;
            serde_json::to_value(MutationResponse::ok())?
        }
        ActionRequest::GetActivityMetrics(p) => {
            let metrics = handlers::get_activity_metrics(store, &p.activity_id).await?;
            serde_json::to_value(ActivityMetricsResponse { metrics })?
        }
        ActionRequest::GetActivityAssessment(p) => {
            let values =
                handlers::get_activity_assessment(store, &p.student_id, &p.activity_id).await?;
            serde_json::to_value(AssessmentResponse { values })?
        }
        ActionRequest::SaveActivityAssessment(p) => {
            handlers::save_activity_assessment(store, &p.student_id, &p.activity_id, &p.metrics)
                .await?;
            serde_json::to_value(MutationResponse::ok())?
        }
        ActionRequest::GetPersonalPlanTemplates => {
            let tasks = handlers::get_personal_plan_templates(store).await?;
            serde_json::to_value(TemplatesResponse { tasks })?
        }
        ActionRequest::AssignTasksToStudent(p) => {
            handlers::assign_tasks_to_student(store, &p.student_id, &p.date, &p.task_ids)
                .await?;
            serde_json::to_value(MutationResponse::ok())?
        }
    };
    Ok(result)
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}
