use chrono::Utc;
use tracing::{info, instrument};

use crate::dates::{date_key, in_range, today_key};
use crate::error::AppError;
use crate::models::{
    Activity, ActivityMetric, AssessmentValue, MetricMark, PlanTask, PlanTemplate, Skill,
    SkillMetric, StudentSkill, User,
};
use crate::store::schema::{
    ACTIVITIES, ACTIVITY_ASSESSMENTS, ACTIVITY_COMPLETIONS, ACTIVITY_METRICS, ALL_TABLES,
    DEFAULT_ADMIN, DEFAULT_PLAN_TEMPLATES, DEFAULT_SKILL_METRICS, DEFAULT_SKILLS,
    PERSONAL_PLAN_TEMPLATES, SELF_ASSESSMENTS, SKILL_METRICS, SKILLS, STUDENT_DAILY_TASKS,
    STUDENT_SKILL_LEVELS, USERS,
};
use crate::store::{RowStore, parse_bool, parse_yes_no};

/// Row ids are `<PREFIX>-<millisecond timestamp>`; collisions at human pace
/// are accepted as negligible.
fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Utc::now().timestamp_millis())
}

fn bool_cell(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

fn yes_no_cell(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}

/// Bring the workbook to a usable state: all tables present with headers, the
/// bootstrap admin account, and the skill catalogs. Runs on every request but
/// is effectively free after the first thanks to the existence cache.
#[instrument(skip_all)]
pub async fn ensure_workbook(store: &RowStore) -> Result<(), AppError> {
    store.ensure_tables(ALL_TABLES).await?;
    ensure_admin_user(store).await?;
    ensure_skill_catalog(store).await?;
    Ok(())
}

async fn ensure_admin_user(store: &RowStore) -> Result<(), AppError> {
    let users = store.read_table(&USERS).await?;
    if users.is_empty() {
        info!("Seeding bootstrap admin account");
        store
            .append_row(&USERS, DEFAULT_ADMIN.iter().map(|s| s.to_string()).collect())
            .await?;
    }
    Ok(())
}

async fn ensure_skill_catalog(store: &RowStore) -> Result<(), AppError> {
    let skills = store.read_table(&SKILLS).await?;
    if skills.is_empty() {
        info!("Seeding default skill catalog");
        for skill in DEFAULT_SKILLS {
            store
                .append_row(&SKILLS, vec![skill.id.to_string(), skill.name_he.to_string()])
                .await?;
        }
    }

    let metrics = store.read_table(&SKILL_METRICS).await?;
    if metrics.is_empty() {
        info!("Seeding default skill metrics");
        for metric in DEFAULT_SKILL_METRICS {
            store
                .append_row(
                    &SKILL_METRICS,
                    vec![
                        metric.metric_id.to_string(),
                        metric.skill_id.to_string(),
                        metric.name_he.to_string(),
                        metric.description_he.to_string(),
                    ],
                )
                .await?;
        }
    }
    Ok(())
}

#[instrument(skip(store, password))]
pub async fn login(store: &RowStore, username: &str, password: &str) -> Result<User, AppError> {
    info!("Authenticating user");
    if username.is_empty() || password.is_empty() {
        return Err(AppError::Validation("Missing credentials".to_string()));
    }

    let mut users = store.read_table(&USERS).await?;
    if users.is_empty() {
        ensure_admin_user(store).await?;
        users = store.read_table(&USERS).await?;
    }

    let user_col = users.col("username")?;
    let pass_col = users.col("password")?;
    for row in users.data_rows() {
        if users.cell(row, user_col).eq_ignore_ascii_case(username)
            && users.cell(row, pass_col) == password
        {
            return User::from_row(&users, row);
        }
    }
    Err(AppError::Authentication("Invalid credentials".to_string()))
}

#[instrument(skip(store))]
pub async fn get_students(store: &RowStore) -> Result<Vec<User>, AppError> {
    info!("Listing students");
    let users = store.read_table(&USERS).await?;
    if users.is_empty() {
        return Ok(Vec::new());
    }

    let role_col = users.col("role")?;
    let mut students = Vec::new();
    for row in users.data_rows() {
        if users.cell(row, role_col) == "student" {
            students.push(User::from_row(&users, row)?);
        }
    }
    Ok(students)
}

#[instrument(skip(store, password))]
pub async fn add_student(
    store: &RowStore,
    username: &str,
    password: &str,
    display_name: &str,
) -> Result<String, AppError> {
    info!("Adding student");
    let display = if display_name.is_empty() { username } else { display_name };
    let id = generate_id("ST");
    store
        .append_row(
            &USERS,
            vec![
                id.clone(),
                username.to_string(),
                password.to_string(),
                "student".to_string(),
                display.to_string(),
                "active".to_string(),
            ],
        )
        .await?;
    Ok(id)
}

#[instrument(skip(store, new_password))]
pub async fn update_student_password(
    store: &RowStore,
    student_id: &str,
    new_password: &str,
) -> Result<(), AppError> {
    info!("Updating student password");
    let users = store.read_table(&USERS).await?;
    let pass_col = users.col("password")?;
    match users.find("id", student_id)? {
        Some(row) => {
            store.update_cell(&USERS, row, pass_col, new_password).await?;
            Ok(())
        }
        None => Err(AppError::NotFound("Student not found".to_string())),
    }
}

#[instrument(skip(store))]
pub async fn update_student_status(
    store: &RowStore,
    student_id: &str,
    status: &str,
) -> Result<(), AppError> {
    info!("Updating student status");
    let users = store.read_table(&USERS).await?;
    let status_col = users
        .col_opt("status")
        .ok_or_else(|| AppError::Validation("No status column".to_string()))?;
    match users.find("id", student_id)? {
        Some(row) => {
            store.update_cell(&USERS, row, status_col, status).await?;
            Ok(())
        }
        None => Err(AppError::NotFound("Student not found".to_string())),
    }
}

#[instrument(skip(store))]
pub async fn get_skills(store: &RowStore) -> Result<Vec<Skill>, AppError> {
    info!("Listing skills");
    ensure_skill_catalog(store).await?;
    let skills = store.read_table(&SKILLS).await?;
    if skills.is_empty() {
        return Ok(Vec::new());
    }

    let id_col = skills.col("id")?;
    let name_col = skills.col("nameHe")?;
    Ok(skills
        .data_rows()
        .map(|row| Skill {
            id: skills.cell(row, id_col).to_string(),
            name_he: skills.cell(row, name_col).to_string(),
        })
        .collect())
}

#[instrument(skip(store))]
pub async fn get_student_skills(
    store: &RowStore,
    student_id: &str,
) -> Result<Vec<StudentSkill>, AppError> {
    info!("Listing skills with student levels");
    let skills = store.read_table(&SKILLS).await?;
    let levels = store.read_table(&STUDENT_SKILL_LEVELS).await?;

    // Sparse level rows; anything missing reads as level 1 with 0% progress.
    let mut level_map = std::collections::HashMap::new();
    if !levels.is_empty() {
        let student_col = levels.col("studentId")?;
        let skill_col = levels.col("skillId")?;
        let level_col = levels.col("level")?;
        let pct_col = levels.col_opt("progressPercent");
        for row in levels.data_rows() {
            if levels.cell(row, student_col) == student_id {
                // Level 0 is not a real level; coerce it to 1 like any other
                // unparseable cell.
                let level = levels
                    .cell(row, level_col)
                    .parse::<u32>()
                    .ok()
                    .filter(|&l| l > 0)
                    .unwrap_or(1);
                let pct = match pct_col {
                    Some(col) => levels.cell(row, col).parse::<u32>().unwrap_or(0),
                    None => 50,
                };
                level_map.insert(levels.cell(row, skill_col).to_string(), (level, pct));
            }
        }
    }

    let id_col = skills.col("id")?;
    let name_col = skills.col("nameHe")?;
    Ok(skills
        .data_rows()
        .map(|row| {
            let id = skills.cell(row, id_col).to_string();
            let (level, progress_percent) = level_map.get(&id).copied().unwrap_or((1, 0));
            StudentSkill {
                name_he: skills.cell(row, name_col).to_string(),
                id,
                level,
                progress_percent,
            }
        })
        .collect())
}

#[instrument(skip(store))]
pub async fn get_skill_metrics(
    store: &RowStore,
    skill_id: &str,
) -> Result<Vec<SkillMetric>, AppError> {
    info!("Listing skill metrics");
    let metrics = store.read_table(&SKILL_METRICS).await?;
    if metrics.is_empty() {
        return Ok(Vec::new());
    }

    let id_col = metrics.col("id")?;
    let skill_col = metrics.col("skillId")?;
    let name_col = metrics.col("nameHe")?;
    let desc_col = metrics.col_opt("descriptionHe");
    let mut out = Vec::new();
    for row in metrics.data_rows() {
        if metrics.cell(row, skill_col) == skill_id {
            out.push(SkillMetric {
                id: metrics.cell(row, id_col).to_string(),
                skill_id: skill_id.to_string(),
                name_he: metrics.cell(row, name_col).to_string(),
                description_he: desc_col
                    .map(|c| metrics.cell(row, c).to_string())
                    .unwrap_or_default(),
            });
        }
    }
    Ok(out)
}

/// Self-assessments are an append-only log: one row per metric per
/// submission, stamped with today's date key.
#[instrument(skip(store, metrics))]
pub async fn save_self_assessment(
    store: &RowStore,
    student_id: &str,
    skill_id: &str,
    metrics: &[MetricMark],
) -> Result<(), AppError> {
    info!(count = metrics.len(), "Recording self assessment");
    let date = today_key();
    for metric in metrics {
        store
            .append_row(
                &SELF_ASSESSMENTS,
                vec![
                    student_id.to_string(),
                    skill_id.to_string(),
                    date.clone(),
                    metric.metric_id.clone(),
                    yes_no_cell(metric.value),
                ],
            )
            .await?;
    }
    Ok(())
}

#[instrument(skip(store))]
pub async fn get_personal_plan_templates(
    store: &RowStore,
) -> Result<Vec<PlanTemplate>, AppError> {
    info!("Listing plan templates");
    let mut templates = store.read_table(&PERSONAL_PLAN_TEMPLATES).await?;
    if templates.is_empty() {
        info!("Seeding default plan templates");
        for (id, name_he) in DEFAULT_PLAN_TEMPLATES {
            store
                .append_row(
                    &PERSONAL_PLAN_TEMPLATES,
                    vec![id.to_string(), name_he.to_string()],
                )
                .await?;
        }
        templates = store.read_table(&PERSONAL_PLAN_TEMPLATES).await?;
    }

    let id_col = templates.col("id")?;
    let name_col = templates.col("nameHe")?;
    Ok(templates
        .data_rows()
        .map(|row| PlanTemplate {
            id: templates.cell(row, id_col).to_string(),
            name_he: templates.cell(row, name_col).to_string(),
        })
        .collect())
}

/// Daily tasks for one (student, date). The first read of a date with no rows
/// materializes one uncompleted row per template; a later read finds those
/// rows and must not materialize again.
#[instrument(skip(store))]
pub async fn get_personal_plan_tasks(
    store: &RowStore,
    student_id: &str,
    date: &str,
) -> Result<Vec<PlanTask>, AppError> {
    info!("Listing personal plan tasks");
    let date = date_key(date);
    let templates = get_personal_plan_templates(store).await?;
    let name_map: std::collections::HashMap<&str, &str> = templates
        .iter()
        .map(|t| (t.id.as_str(), t.name_he.as_str()))
        .collect();

    // Two passes at most: collect, materialize defaults if empty, re-collect.
    for attempt in 0..2 {
        let tasks = collect_tasks_for_date(store, student_id, &date, &name_map).await?;
        if !tasks.is_empty() || templates.is_empty() || attempt == 1 {
            return Ok(tasks);
        }

        info!("Materializing default tasks for date");
        for template in &templates {
            store
                .append_row(
                    &STUDENT_DAILY_TASKS,
                    vec![
                        student_id.to_string(),
                        template.id.clone(),
                        date.clone(),
                        bool_cell(false),
                        String::new(),
                        "normal".to_string(),
                    ],
                )
                .await?;
        }
    }
    unreachable!("loop returns on second attempt");
}

async fn collect_tasks_for_date(
    store: &RowStore,
    student_id: &str,
    date: &str,
    name_map: &std::collections::HashMap<&str, &str>,
) -> Result<Vec<PlanTask>, AppError> {
    let table = store.read_table(&STUDENT_DAILY_TASKS).await?;
    if table.is_empty() {
        return Ok(Vec::new());
    }

    let student_col = table.col("studentId")?;
    let task_col = table.col("taskId")?;
    let date_col = table.col("date")?;
    let done_col = table.col("completed")?;
    let time_col = table.col_opt("timeLabel");
    let pri_col = table.col_opt("priority");

    let mut tasks = Vec::new();
    for row in table.data_rows() {
        if table.cell(row, student_col) == student_id
            && date_key(table.cell(row, date_col)) == date
        {
            let task_id = table.cell(row, task_col);
            tasks.push(PlanTask {
                id: task_id.to_string(),
                name_he: name_map.get(task_id).unwrap_or(&task_id).to_string(),
                completed: parse_bool(table.cell(row, done_col)),
                time_label: time_col.map(|c| table.cell(row, c).to_string()),
                priority: pri_col.map(|c| table.cell(row, c).to_string()),
            });
        }
    }
    Ok(tasks)
}

/// Last-write-wins toggle; a missing row is created rather than failing, so
/// toggles work for tasks assigned outside the template flow.
#[instrument(skip(store))]
pub async fn set_task_completed(
    store: &RowStore,
    student_id: &str,
    task_id: &str,
    date: &str,
    completed: bool,
) -> Result<(), AppError> {
    info!("Setting task completion");
    let date = date_key(date);
    let table = store.read_table(&STUDENT_DAILY_TASKS).await?;

    if !table.is_empty() {
        let student_col = table.col("studentId")?;
        let task_col = table.col("taskId")?;
        let date_col = table.col("date")?;
        let done_col = table.col("completed")?;
        for row in table.data_rows() {
            if table.cell(row, student_col) == student_id
                && table.cell(row, task_col) == task_id
                && date_key(table.cell(row, date_col)) == date
            {
                store
                    .update_cell(&STUDENT_DAILY_TASKS, row, done_col, &bool_cell(completed))
                    .await?;
                return Ok(());
            }
        }
    }

    store
        .append_row(
            &STUDENT_DAILY_TASKS,
            vec![
                student_id.to_string(),
                task_id.to_string(),
                date,
                bool_cell(completed),
                String::new(),
                "normal".to_string(),
            ],
        )
        .await?;
    Ok(())
}

#[instrument(skip(store))]
pub async fn get_activities_for_date(
    store: &RowStore,
    student_id: &str,
    date: &str,
) -> Result<Vec<Activity>, AppError> {
    info!("Listing activities for date");
    let date = date_key(date);
    let activities = store.read_table(&ACTIVITIES).await?;
    let completions = store.read_table(&ACTIVITY_COMPLETIONS).await?;

    let mut completed_map = std::collections::HashMap::new();
    if !completions.is_empty() {
        let act_col = completions.col("activityId")?;
        let student_col = completions.col("studentId")?;
        let done_col = completions.col("completed")?;
        for row in completions.data_rows() {
            if completions.cell(row, student_col) == student_id {
                completed_map.insert(
                    completions.cell(row, act_col).to_string(),
                    parse_bool(completions.cell(row, done_col)),
                );
            }
        }
    }

    let mut out = Vec::new();
    if !activities.is_empty() {
        let date_col = activities.col("date")?;
        for row in activities.data_rows() {
            let row_date = date_key(activities.cell(row, date_col));
            if row_date == date {
                let mut activity = Activity::from_row(&activities, row, row_date)?;
                activity.completed =
                    Some(completed_map.get(&activity.id).copied().unwrap_or(false));
                out.push(activity);
            }
        }
    }
    Ok(out)
}

#[instrument(skip(store))]
pub async fn get_activities_for_date_range(
    store: &RowStore,
    start_date: &str,
    end_date: &str,
) -> Result<Vec<Activity>, AppError> {
    info!("Listing activities for date range");
    let start = date_key(start_date);
    let end = date_key(end_date);
    let activities = store.read_table(&ACTIVITIES).await?;
    if activities.is_empty() {
        return Ok(Vec::new());
    }

    let date_col = activities.col("date")?;
    let mut out = Vec::new();
    for row in activities.data_rows() {
        let row_date = date_key(activities.cell(row, date_col));
        if in_range(&row_date, &start, &end) {
            out.push(Activity::from_row(&activities, row, row_date)?);
        }
    }
    Ok(out)
}

pub struct NewActivity {
    pub date: String,
    pub title_he: String,
    pub description_he: Option<String>,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
}

/// Create a calendar activity plus its three default assessment metrics.
#[instrument(skip(store, activity))]
pub async fn add_activity(store: &RowStore, activity: NewActivity) -> Result<String, AppError> {
    info!("Adding activity");
    if activity.date.is_empty() || activity.title_he.is_empty() {
        return Err(AppError::Validation("Missing date or titleHe".to_string()));
    }

    let id = generate_id("ACT");
    store
        .append_row(
            &ACTIVITIES,
            vec![
                id.clone(),
                date_key(&activity.date),
                activity.title_he,
                activity.description_he.unwrap_or_default(),
                activity.time_start.unwrap_or_default(),
                activity.time_end.unwrap_or_default(),
            ],
        )
        .await?;

    seed_activity_metrics(store, &id).await?;
    Ok(id)
}

async fn seed_activity_metrics(store: &RowStore, activity_id: &str) -> Result<(), AppError> {
    for metric in &DEFAULT_SKILL_METRICS[..3] {
        store
            .append_row(
                &ACTIVITY_METRICS,
                vec![
                    activity_id.to_string(),
                    metric.metric_id.to_string(),
                    metric.name_he.to_string(),
                    metric.description_he.to_string(),
                ],
            )
            .await?;
    }
    Ok(())
}

pub struct ActivityPatch {
    pub date: Option<String>,
    pub title_he: Option<String>,
    pub description_he: Option<String>,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
}

#[instrument(skip(store, patch))]
pub async fn update_activity(
    store: &RowStore,
    activity_id: &str,
    patch: ActivityPatch,
) -> Result<(), AppError> {
    info!("Updating activity");
    let activities = store.read_table(&ACTIVITIES).await?;
    let row = activities
        .find("id", activity_id)?
        .ok_or_else(|| AppError::NotFound("Not found".to_string()))?;

    let fields = [
        ("date", patch.date.map(|d| date_key(&d))),
        ("titleHe", patch.title_he),
        ("descriptionHe", patch.description_he),
        ("timeStart", patch.time_start),
        ("timeEnd", patch.time_end),
    ];
    for (header, value) in fields {
        if let (Some(value), Some(col)) = (value, activities.col_opt(header)) {
            store.update_cell(&ACTIVITIES, row, col, &value).await?;
        }
    }
    Ok(())
}

/// Remove the activity row. Satellite completion/metric/assessment rows are
/// left in place; they are keyed by an id that no longer resolves and every
/// reader filters by activity id, so orphans are invisible.
#[instrument(skip(store))]
pub async fn delete_activity(store: &RowStore, activity_id: &str) -> Result<(), AppError> {
    info!("Deleting activity");
    let activities = store.read_table(&ACTIVITIES).await?;
    let id_col = activities.col("id")?;

    // Bottom-up so the matched index is still valid when the delete lands.
    for row in activities.data_rows().rev() {
        if activities.cell(row, id_col) == activity_id {
            store.delete_row(&ACTIVITIES, row).await?;
            return Ok(());
        }
    }
    Err(AppError::NotFound("Not found".to_string()))
}

#[instrument(skip(store))]
pub async fn set_activity_completed(
    store: &RowStore,
    student_id: &str,
    activity_id: &str,
    completed: bool,
) -> Result<(), AppError> {
    info!("Setting activity completion");
    let table = store.read_table(&ACTIVITY_COMPLETIONS).await?;

    if !table.is_empty() {
        let act_col = table.col("activityId")?;
        let student_col = table.col("studentId")?;
        let done_col = table.col("completed")?;
        for row in table.data_rows() {
            if table.cell(row, act_col) == activity_id
                && table.cell(row, student_col) == student_id
            {
                store
                    .update_cell(&ACTIVITY_COMPLETIONS, row, done_col, &bool_cell(completed))
                    .await?;
                return Ok(());
            }
        }
    }

    store
        .append_row(
            &ACTIVITY_COMPLETIONS,
            vec![
                activity_id.to_string(),
                student_id.to_string(),
                bool_cell(completed),
            ],
        )
        .await?;
    Ok(())
}

/// Metrics for one activity, materializing the three defaults when the
/// activity has none (activities created before metrics existed).
#[instrument(skip(store))]
pub async fn get_activity_metrics(
    store: &RowStore,
    activity_id: &str,
) -> Result<Vec<ActivityMetric>, AppError> {
    info!("Listing activity metrics");
    for attempt in 0..2 {
        let metrics = collect_activity_metrics(store, activity_id).await?;
        if !metrics.is_empty() || attempt == 1 {
            return Ok(metrics);
        }
        info!("Materializing default metrics for activity");
        seed_activity_metrics(store, activity_id).await?;
    }
    unreachable!("loop returns on second attempt");
}

async fn collect_activity_metrics(
    store: &RowStore,
    activity_id: &str,
) -> Result<Vec<ActivityMetric>, AppError> {
    let table = store.read_table(&ACTIVITY_METRICS).await?;
    if table.is_empty() {
        return Ok(Vec::new());
    }

    let act_col = table.col("activityId")?;
    let id_col = table.col("metricId")?;
    let name_col = table.col("nameHe")?;
    let desc_col = table.col_opt("descriptionHe");
    let mut out = Vec::new();
    for row in table.data_rows() {
        if table.cell(row, act_col) == activity_id {
            out.push(ActivityMetric {
                id: table.cell(row, id_col).to_string(),
                activity_id: activity_id.to_string(),
                name_he: table.cell(row, name_col).to_string(),
                description_he: desc_col
                    .map(|c| table.cell(row, c).to_string())
                    .unwrap_or_default(),
            });
        }
    }
    Ok(out)
}

#[instrument(skip(store))]
pub async fn get_activity_assessment(
    store: &RowStore,
    student_id: &str,
    activity_id: &str,
) -> Result<Vec<AssessmentValue>, AppError> {
    info!("Reading activity assessment");
    let table = store.read_table(&ACTIVITY_ASSESSMENTS).await?;
    if table.is_empty() {
        return Ok(Vec::new());
    }

    let act_col = table.col("activityId")?;
    let student_col = table.col("studentId")?;
    let metric_col = table.col("metricId")?;
    let value_col = table.col("value")?;
    let mut out = Vec::new();
    for row in table.data_rows() {
        if table.cell(row, act_col) == activity_id
            && table.cell(row, student_col) == student_id
        {
            out.push(AssessmentValue {
                metric_id: table.cell(row, metric_col).to_string(),
                value: parse_yes_no(table.cell(row, value_col)),
            });
        }
    }
    Ok(out)
}

/// Upsert per metric: one row per (activity, student, metric) triple, updated
/// in place on resubmission.
#[instrument(skip(store, metrics))]
pub async fn save_activity_assessment(
    store: &RowStore,
    student_id: &str,
    activity_id: &str,
    metrics: &[MetricMark],
) -> Result<(), AppError> {
    info!(count = metrics.len(), "Saving activity assessment");
    for metric in metrics {
        // Re-read per metric: earlier appends in this loop move rows, and the
        // write invalidated the cache anyway.
        let table = store.read_table(&ACTIVITY_ASSESSMENTS).await?;
        let mut updated = false;

        if !table.is_empty() {
            let act_col = table.col("activityId")?;
            let student_col = table.col("studentId")?;
            let metric_col = table.col("metricId")?;
            let value_col = table.col("value")?;
            for row in table.data_rows() {
                if table.cell(row, act_col) == activity_id
                    && table.cell(row, student_col) == student_id
                    && table.cell(row, metric_col) == metric.metric_id
                {
                    store
                        .update_cell(
                            &ACTIVITY_ASSESSMENTS,
                            row,
                            value_col,
                            &yes_no_cell(metric.value),
                        )
                        .await?;
                    updated = true;
                    break;
                }
            }
        }

        if !updated {
            store
                .append_row(
                    &ACTIVITY_ASSESSMENTS,
                    vec![
                        activity_id.to_string(),
                        student_id.to_string(),
                        metric.metric_id.clone(),
                        yes_no_cell(metric.value),
                    ],
                )
                .await?;
        }
    }
    Ok(())
}

#[instrument(skip(store, task_ids))]
pub async fn assign_tasks_to_student(
    store: &RowStore,
    student_id: &str,
    date: &str,
    task_ids: &[String],
) -> Result<(), AppError> {
    info!(count = task_ids.len(), "Assigning tasks to student");
    let date = date_key(date);
    for task_id in task_ids {
        store
            .append_row(
                &STUDENT_DAILY_TASKS,
                vec![
                    student_id.to_string(),
                    task_id.clone(),
                    date.clone(),
                    bool_cell(false),
                    String::new(),
                    "normal".to_string(),
                ],
            )
            .await?;
    }
    Ok(())
}
