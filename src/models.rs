use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::store::Table;

/// A Users row. Passwords stay inside the handlers; this is the shape that
/// leaves the API.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub status: String,
}

impl User {
    /// Project one data row into a `User`. Older workbooks may predate the
    /// displayName/status columns; fall back the way the sheet always has.
    pub fn from_row(table: &Table, row: usize) -> Result<Self, AppError> {
        let username = table.get(row, "username")?.to_string();
        let display_name = match table.col_opt("displayName") {
            Some(col) => {
                let v = table.cell(row, col);
                if v.is_empty() { username.clone() } else { v.to_string() }
            }
            None => username.clone(),
        };
        let status = match table.col_opt("status") {
            Some(col) => {
                let v = table.cell(row, col);
                if v.is_empty() { "active".to_string() } else { v.to_string() }
            }
            None => "active".to_string(),
        };
        let role = {
            let v = table.get(row, "role")?;
            if v.is_empty() { "student".to_string() } else { v.to_string() }
        };
        Ok(Self {
            id: table.get(row, "id")?.to_string(),
            username,
            display_name,
            role,
            status,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub name_he: String,
}

/// A skill joined with one student's sparse level row; missing rows read as
/// level 1 with no progress.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StudentSkill {
    pub id: String,
    pub name_he: String,
    pub level: u32,
    pub progress_percent: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SkillMetric {
    pub id: String,
    pub skill_id: String,
    pub name_he: String,
    pub description_he: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlanTemplate {
    pub id: String,
    pub name_he: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlanTask {
    pub id: String,
    pub name_he: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub date: String,
    pub title_he: String,
    pub description_he: String,
    pub time_start: String,
    pub time_end: String,
    /// Present only on the per-student daily view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl Activity {
    pub fn from_row(table: &Table, row: usize, date_key: String) -> Result<Self, AppError> {
        Ok(Self {
            id: table.get(row, "id")?.to_string(),
            date: date_key,
            title_he: table.get(row, "titleHe")?.to_string(),
            description_he: table
                .col_opt("descriptionHe")
                .map(|c| table.cell(row, c).to_string())
                .unwrap_or_default(),
            time_start: table
                .col_opt("timeStart")
                .map(|c| table.cell(row, c).to_string())
                .unwrap_or_default(),
            time_end: table
                .col_opt("timeEnd")
                .map(|c| table.cell(row, c).to_string())
                .unwrap_or_default(),
            completed: None,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ActivityMetric {
    pub id: String,
    pub activity_id: String,
    pub name_he: String,
    pub description_he: String,
}

/// One metric answer inside a save-assessment request.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MetricMark {
    pub metric_id: String,
    pub value: bool,
}

/// One stored assessment answer returned to the client.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentValue {
    pub metric_id: String,
    pub value: bool,
}
