#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::api::{
        ActivitiesResponse, ActivityMetricsResponse, AssessmentResponse, CreatedResponse,
        LoginResponse, SkillsResponse, StudentSkillsResponse, StudentsResponse, TasksResponse,
        TemplatesResponse,
    };
    use crate::store::schema::STUDENT_SKILL_LEVELS;
    use crate::test::utils::test_utils::{
        STANDARD_PASSWORD, TestWorkbookBuilder, create_standard_workbook, post_action,
        setup_test_client,
    };

    #[rocket::async_test]
    async fn test_login() {
        let workbook = create_standard_workbook().await;
        let (client, _) = setup_test_client(workbook).await;

        let body = post_action(
            &client,
            json!({ "action": "login", "username": "dana", "password": STANDARD_PASSWORD }),
        )
        .await;
        let login: LoginResponse = serde_json::from_value(body).unwrap();
        assert!(login.success);
        assert_eq!(login.user.unwrap().id, "ST-100");

        // Username matching is case-insensitive, the password is not.
        let body = post_action(
            &client,
            json!({ "action": "login", "username": "DANA", "password": STANDARD_PASSWORD }),
        )
        .await;
        let login: LoginResponse = serde_json::from_value(body).unwrap();
        assert!(login.success);

        let body = post_action(
            &client,
            json!({ "action": "login", "username": "dana", "password": "wrong" }),
        )
        .await;
        let login: LoginResponse = serde_json::from_value(body).unwrap();
        assert!(!login.success);
        assert_eq!(login.error.unwrap(), "Invalid credentials");
    }

    #[rocket::async_test]
    async fn test_login_bootstrap_admin() {
        let workbook = TestWorkbookBuilder::new().build().await;
        let (client, _) = setup_test_client(workbook).await;

        let body = post_action(
            &client,
            json!({ "action": "login", "username": "admin", "password": "admin123" }),
        )
        .await;
        let login: LoginResponse = serde_json::from_value(body).unwrap();
        assert!(login.success);

        let user = login.user.unwrap();
        assert_eq!(user.id, "ADMIN-1");
        assert_eq!(user.role, "admin");
        assert_eq!(user.display_name, "מנהל");
    }

    #[rocket::async_test]
    async fn test_missing_and_unknown_actions() {
        let workbook = TestWorkbookBuilder::new().build().await;
        let (client, _) = setup_test_client(workbook).await;

        let body = post_action(&client, json!({ "username": "dana" })).await;
        assert_eq!(body["error"], "Missing action");

        let body = post_action(&client, json!({ "action": "frobnicate" })).await;
        assert_eq!(body["error"], "Unknown action: frobnicate");
    }

    #[rocket::async_test]
    async fn test_student_management() {
        let workbook = create_standard_workbook().await;
        let (client, _) = setup_test_client(workbook).await;

        let body = post_action(
            &client,
            json!({
                "action": "addStudent",
                "username": "maya",
                "password": "secret1",
                "displayName": "מאיה",
            }),
        )
        .await;
        let created: CreatedResponse = serde_json::from_value(body).unwrap();
        assert!(created.success);
        let new_id = created.id.unwrap();
        assert!(new_id.starts_with("ST-"));

        let body = post_action(&client, json!({ "action": "getStudents" })).await;
        let students: StudentsResponse = serde_json::from_value(body).unwrap();
        // Two seeded students plus the new one; the admin is filtered out.
        assert_eq!(students.students.len(), 3);
        let maya = students
            .students
            .iter()
            .find(|s| s.id == new_id)
            .expect("new student listed");
        assert_eq!(maya.display_name, "מאיה");
        assert_eq!(maya.status, "active");

        let body = post_action(
            &client,
            json!({
                "action": "updateStudentPassword",
                "studentId": new_id,
                "newPassword": "secret2",
            }),
        )
        .await;
        assert_eq!(body["success"], true);

        let body = post_action(
            &client,
            json!({ "action": "login", "username": "maya", "password": "secret2" }),
        )
        .await;
        let login: LoginResponse = serde_json::from_value(body).unwrap();
        assert!(login.success);

        let body = post_action(
            &client,
            json!({
                "action": "updateStudentStatus",
                "studentId": new_id,
                "status": "inactive",
            }),
        )
        .await;
        assert_eq!(body["success"], true);

        let body = post_action(
            &client,
            json!({
                "action": "updateStudentStatus",
                "studentId": "ST-nope",
                "status": "inactive",
            }),
        )
        .await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Student not found");
    }

    #[rocket::async_test]
    async fn test_skill_catalog_and_defaults() {
        let workbook = create_standard_workbook().await;
        let (client, _) = setup_test_client(workbook).await;

        let body = post_action(&client, json!({ "action": "getSkills" })).await;
        let skills: SkillsResponse = serde_json::from_value(body).unwrap();
        assert_eq!(skills.skills.len(), 6);
        assert!(skills.skills.iter().any(|s| s.id == "cooking"));

        // No level rows yet: every skill reads as level 1, 0% progress.
        let body = post_action(
            &client,
            json!({ "action": "getStudentSkills", "studentId": "ST-100" }),
        )
        .await;
        let skills: StudentSkillsResponse = serde_json::from_value(body).unwrap();
        assert_eq!(skills.skills.len(), 6);
        for skill in &skills.skills {
            assert_eq!(skill.level, 1);
            assert_eq!(skill.progress_percent, 0);
        }

        let body = post_action(
            &client,
            json!({ "action": "getSkillMetrics", "skillId": "cooking" }),
        )
        .await;
        let metrics: crate::api::SkillMetricsResponse = serde_json::from_value(body).unwrap();
        assert_eq!(metrics.metrics.len(), 3);
        assert!(metrics.metrics.iter().all(|m| m.skill_id == "cooking"));
    }

    #[rocket::async_test]
    async fn test_student_skill_levels_coerce_bad_cells() {
        let workbook = create_standard_workbook().await;
        // A hand-edited "0" is not a real level and must read as 1.
        workbook
            .store
            .append_row(
                &STUDENT_SKILL_LEVELS,
                vec!["ST-100".into(), "cooking".into(), "0".into(), "40".into()],
            )
            .await
            .unwrap();
        workbook
            .store
            .append_row(
                &STUDENT_SKILL_LEVELS,
                vec!["ST-100".into(), "computer".into(), "3".into(), "60".into()],
            )
            .await
            .unwrap();
        let (client, _) = setup_test_client(workbook).await;

        let body = post_action(
            &client,
            json!({ "action": "getStudentSkills", "studentId": "ST-100" }),
        )
        .await;
        let skills: StudentSkillsResponse = serde_json::from_value(body).unwrap();

        let cooking = skills.skills.iter().find(|s| s.id == "cooking").unwrap();
        assert_eq!(cooking.level, 1);
        assert_eq!(cooking.progress_percent, 40);

        let computer = skills.skills.iter().find(|s| s.id == "computer").unwrap();
        assert_eq!(computer.level, 3);
        assert_eq!(computer.progress_percent, 60);
    }

    #[rocket::async_test]
    async fn test_self_assessment_appends_rows() {
        let workbook = create_standard_workbook().await;
        let (client, transport) = setup_test_client(workbook).await;

        let body = post_action(
            &client,
            json!({
                "action": "saveSelfAssessment",
                "studentId": "ST-100",
                "skillId": "cooking",
                "metrics": [
                    { "metricId": "teamwork", "value": true },
                    { "metricId": "quality", "value": false },
                ],
            }),
        )
        .await;
        assert_eq!(body["success"], true);

        let grid = transport.raw_sheet("SelfAssessments");
        assert_eq!(grid.len(), 3, "header plus one row per metric");
        assert_eq!(grid[1][4], "yes");
        assert_eq!(grid[2][4], "no");

        // Submitting again appends; this is a log, not an upsert.
        post_action(
            &client,
            json!({
                "action": "saveSelfAssessment",
                "studentId": "ST-100",
                "skillId": "cooking",
                "metrics": [{ "metricId": "teamwork", "value": false }],
            }),
        )
        .await;
        assert_eq!(transport.raw_sheet("SelfAssessments").len(), 4);
    }

    #[rocket::async_test]
    async fn test_plan_tasks_materialize_once() {
        let workbook = create_standard_workbook().await;
        let (client, transport) = setup_test_client(workbook).await;

        let body = post_action(&client, json!({ "action": "getPersonalPlanTemplates" })).await;
        let templates: TemplatesResponse = serde_json::from_value(body).unwrap();
        assert_eq!(templates.tasks.len(), 4);

        let request = json!({
            "action": "getPersonalPlanTasks",
            "studentId": "ST-100",
            "date": "2025-03-10",
        });

        let body = post_action(&client, request.clone()).await;
        let tasks: TasksResponse = serde_json::from_value(body).unwrap();
        assert_eq!(tasks.tasks.len(), 4);
        assert!(tasks.tasks.iter().all(|t| !t.completed));
        assert_eq!(transport.raw_sheet("StudentDailyTasks").len(), 5);

        // A second read finds the materialized rows and must not add more.
        let body = post_action(&client, request).await;
        let tasks: TasksResponse = serde_json::from_value(body).unwrap();
        assert_eq!(tasks.tasks.len(), 4);
        assert_eq!(transport.raw_sheet("StudentDailyTasks").len(), 5);

        let body = post_action(
            &client,
            json!({
                "action": "setTaskCompleted",
                "studentId": "ST-100",
                "taskId": "t2",
                "date": "2025-03-10",
                "completed": true,
            }),
        )
        .await;
        assert_eq!(body["success"], true);

        let body = post_action(
            &client,
            json!({
                "action": "getPersonalPlanTasks",
                "studentId": "ST-100",
                "date": "2025-03-10",
            }),
        )
        .await;
        let tasks: TasksResponse = serde_json::from_value(body).unwrap();
        let t2 = tasks.tasks.iter().find(|t| t.id == "t2").unwrap();
        assert!(t2.completed);
        assert_eq!(tasks.tasks.iter().filter(|t| t.completed).count(), 1);

        // Toggling back rewrites the existing row in place.
        let body = post_action(
            &client,
            json!({
                "action": "setTaskCompleted",
                "studentId": "ST-100",
                "taskId": "t2",
                "date": "2025-03-10",
                "completed": false,
            }),
        )
        .await;
        assert_eq!(body["success"], true);

        let body = post_action(
            &client,
            json!({
                "action": "getPersonalPlanTasks",
                "studentId": "ST-100",
                "date": "2025-03-10",
            }),
        )
        .await;
        let tasks: TasksResponse = serde_json::from_value(body).unwrap();
        assert!(tasks.tasks.iter().all(|t| !t.completed));
        assert_eq!(transport.raw_sheet("StudentDailyTasks").len(), 5);
    }

    #[rocket::async_test]
    async fn test_assign_tasks_to_student() {
        let workbook = create_standard_workbook().await;
        let (client, _) = setup_test_client(workbook).await;

        let body = post_action(
            &client,
            json!({
                "action": "assignTasksToStudent",
                "studentId": "ST-101",
                "date": "2025-03-11",
                "taskIds": ["t1", "t3"],
            }),
        )
        .await;
        assert_eq!(body["success"], true);

        let body = post_action(
            &client,
            json!({
                "action": "getPersonalPlanTasks",
                "studentId": "ST-101",
                "date": "2025-03-11",
            }),
        )
        .await;
        let tasks: TasksResponse = serde_json::from_value(body).unwrap();
        // Assigned rows already exist for the date, so no materialization.
        assert_eq!(tasks.tasks.len(), 2);
        assert!(tasks.tasks.iter().any(|t| t.id == "t1"));
        assert!(tasks.tasks.iter().any(|t| t.id == "t3"));
    }

    #[rocket::async_test]
    async fn test_activity_lifecycle() {
        let workbook = create_standard_workbook().await;
        let (client, _) = setup_test_client(workbook).await;

        // Dotted day-first input normalizes to the canonical date key.
        let body = post_action(
            &client,
            json!({
                "action": "addActivity",
                "date": "12.03.2025",
                "titleHe": "חוג מחשבים",
                "descriptionHe": "שיעור ראשון",
            }),
        )
        .await;
        let created: CreatedResponse = serde_json::from_value(body).unwrap();
        assert!(created.success);
        let activity_id = created.id.unwrap();
        assert!(activity_id.starts_with("ACT-"));

        let body = post_action(
            &client,
            json!({
                "action": "getActivitiesForDate",
                "studentId": "ST-100",
                "date": "2025-03-12",
            }),
        )
        .await;
        let activities: ActivitiesResponse = serde_json::from_value(body).unwrap();
        assert_eq!(activities.activities.len(), 1);
        let activity = &activities.activities[0];
        assert_eq!(activity.id, activity_id);
        assert_eq!(activity.date, "2025-03-12");
        assert_eq!(activity.completed, Some(false));

        let body = post_action(
            &client,
            json!({
                "action": "setActivityCompleted",
                "studentId": "ST-100",
                "activityId": activity_id,
                "completed": true,
            }),
        )
        .await;
        assert_eq!(body["success"], true);

        let body = post_action(
            &client,
            json!({
                "action": "getActivitiesForDate",
                "studentId": "ST-100",
                "date": "2025-03-12",
            }),
        )
        .await;
        let activities: ActivitiesResponse = serde_json::from_value(body).unwrap();
        assert_eq!(activities.activities[0].completed, Some(true));

        // The other student keeps an independent completion state.
        let body = post_action(
            &client,
            json!({
                "action": "getActivitiesForDate",
                "studentId": "ST-101",
                "date": "2025-03-12",
            }),
        )
        .await;
        let activities: ActivitiesResponse = serde_json::from_value(body).unwrap();
        assert_eq!(activities.activities[0].completed, Some(false));

        let body = post_action(
            &client,
            json!({
                "action": "updateActivity",
                "activityId": activity_id,
                "titleHe": "חוג רובוטיקה",
            }),
        )
        .await;
        assert_eq!(body["success"], true);

        let body = post_action(
            &client,
            json!({
                "action": "getActivitiesForDateRange",
                "startDate": "2025-03-01",
                "endDate": "2025-03-31",
            }),
        )
        .await;
        let activities: ActivitiesResponse = serde_json::from_value(body).unwrap();
        // The seeded 2025-03-10 activity plus the one created above.
        assert_eq!(activities.activities.len(), 2);
        let updated = activities
            .activities
            .iter()
            .find(|a| a.id == activity_id)
            .unwrap();
        assert_eq!(updated.title_he, "חוג רובוטיקה");

        let body = post_action(
            &client,
            json!({ "action": "deleteActivity", "activityId": activity_id }),
        )
        .await;
        assert_eq!(body["success"], true);

        let body = post_action(
            &client,
            json!({ "action": "deleteActivity", "activityId": activity_id }),
        )
        .await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Not found");

        let body = post_action(
            &client,
            json!({
                "action": "getActivitiesForDateRange",
                "startDate": "2025-03-01",
                "endDate": "2025-03-31",
            }),
        )
        .await;
        let activities: ActivitiesResponse = serde_json::from_value(body).unwrap();
        assert_eq!(activities.activities.len(), 1);
        assert_eq!(activities.activities[0].id, "ACT-100");
    }

    #[rocket::async_test]
    async fn test_add_activity_requires_title() {
        let workbook = TestWorkbookBuilder::new().build().await;
        let (client, _) = setup_test_client(workbook).await;

        let body = post_action(
            &client,
            json!({ "action": "addActivity", "date": "2025-03-12", "titleHe": "" }),
        )
        .await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("titleHe"));
    }

    #[rocket::async_test]
    async fn test_activity_metrics_materialize_for_seeded_rows() {
        // ACT-100 was written straight into the sheet, so it has no metric
        // rows until the first read.
        let workbook = create_standard_workbook().await;
        let (client, transport) = setup_test_client(workbook).await;

        assert_eq!(transport.raw_sheet("ActivityMetrics").len(), 1);

        let request = json!({ "action": "getActivityMetrics", "activityId": "ACT-100" });
        let body = post_action(&client, request.clone()).await;
        let metrics: ActivityMetricsResponse = serde_json::from_value(body).unwrap();
        assert_eq!(metrics.metrics.len(), 3);
        assert!(metrics.metrics.iter().all(|m| m.activity_id == "ACT-100"));

        let body = post_action(&client, request).await;
        let metrics: ActivityMetricsResponse = serde_json::from_value(body).unwrap();
        assert_eq!(metrics.metrics.len(), 3);
        assert_eq!(transport.raw_sheet("ActivityMetrics").len(), 4);
    }

    #[rocket::async_test]
    async fn test_activity_assessment_upserts() {
        let workbook = create_standard_workbook().await;
        let (client, transport) = setup_test_client(workbook).await;

        let save = |teamwork: bool, quality: bool| {
            json!({
                "action": "saveActivityAssessment",
                "studentId": "ST-100",
                "activityId": "ACT-100",
                "metrics": [
                    { "metricId": "teamwork", "value": teamwork },
                    { "metricId": "quality", "value": quality },
                ],
            })
        };

        let body = post_action(&client, save(true, false)).await;
        assert_eq!(body["success"], true);

        // Resubmission rewrites the same rows instead of appending new ones.
        let body = post_action(&client, save(true, true)).await;
        assert_eq!(body["success"], true);
        assert_eq!(transport.raw_sheet("ActivityAssessments").len(), 3);

        let body = post_action(
            &client,
            json!({
                "action": "getActivityAssessment",
                "studentId": "ST-100",
                "activityId": "ACT-100",
            }),
        )
        .await;
        let assessment: AssessmentResponse = serde_json::from_value(body).unwrap();
        assert_eq!(assessment.values.len(), 2);
        assert!(assessment.values.iter().all(|v| v.value));

        // A different student's answers live in their own rows.
        let body = post_action(
            &client,
            json!({
                "action": "getActivityAssessment",
                "studentId": "ST-101",
                "activityId": "ACT-100",
            }),
        )
        .await;
        let assessment: AssessmentResponse = serde_json::from_value(body).unwrap();
        assert!(assessment.values.is_empty());
    }

    #[rocket::async_test]
    async fn test_health() {
        let workbook = TestWorkbookBuilder::new().build().await;
        let (client, _) = setup_test_client(workbook).await;

        let response = client.get("/api/health").dispatch().await;
        assert_eq!(response.status(), rocket::http::Status::Ok);
        assert_eq!(response.into_string().await.unwrap(), "OK");
    }
}
