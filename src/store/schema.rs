//! Table layout of the workbook: one named sheet per table, header row first.
//!
//! Column lookups elsewhere are always by name, never by position — the
//! default header sets below can be extended in the live spreadsheet without
//! breaking the service.

pub struct TableDef {
    pub name: &'static str,
    pub headers: &'static [&'static str],
}

pub const USERS: TableDef = TableDef {
    name: "Users",
    headers: &["id", "username", "password", "role", "displayName", "status"],
};

pub const SKILLS: TableDef = TableDef {
    name: "Skills",
    headers: &["id", "nameHe"],
};

pub const SKILL_METRICS: TableDef = TableDef {
    name: "SkillMetrics",
    headers: &["id", "skillId", "nameHe", "descriptionHe"],
};

pub const STUDENT_SKILL_LEVELS: TableDef = TableDef {
    name: "StudentSkillLevels",
    headers: &["studentId", "skillId", "level", "progressPercent"],
};

pub const SELF_ASSESSMENTS: TableDef = TableDef {
    name: "SelfAssessments",
    headers: &["studentId", "skillId", "date", "metricId", "value"],
};

pub const PERSONAL_PLAN_TEMPLATES: TableDef = TableDef {
    name: "PersonalPlanTemplates",
    headers: &["id", "nameHe"],
};

pub const STUDENT_DAILY_TASKS: TableDef = TableDef {
    name: "StudentDailyTasks",
    headers: &["studentId", "taskId", "date", "completed", "timeLabel", "priority"],
};

pub const ACTIVITIES: TableDef = TableDef {
    name: "Activities",
    headers: &["id", "date", "titleHe", "descriptionHe", "timeStart", "timeEnd"],
};

pub const ACTIVITY_COMPLETIONS: TableDef = TableDef {
    name: "ActivityCompletions",
    headers: &["activityId", "studentId", "completed"],
};

pub const ACTIVITY_METRICS: TableDef = TableDef {
    name: "ActivityMetrics",
    headers: &["activityId", "metricId", "nameHe", "descriptionHe"],
};

pub const ACTIVITY_ASSESSMENTS: TableDef = TableDef {
    name: "ActivityAssessments",
    headers: &["activityId", "studentId", "metricId", "value"],
};

pub const ALL_TABLES: &[&TableDef] = &[
    &USERS,
    &SKILLS,
    &SKILL_METRICS,
    &STUDENT_SKILL_LEVELS,
    &SELF_ASSESSMENTS,
    &PERSONAL_PLAN_TEMPLATES,
    &STUDENT_DAILY_TASKS,
    &ACTIVITIES,
    &ACTIVITY_COMPLETIONS,
    &ACTIVITY_METRICS,
    &ACTIVITY_ASSESSMENTS,
];

/// Bootstrap admin row, appended once when Users has no data rows.
pub const DEFAULT_ADMIN: [&str; 6] = ["ADMIN-1", "admin", "admin123", "admin", "מנהל", "active"];

pub struct SeedSkill {
    pub id: &'static str,
    pub name_he: &'static str,
}

pub const DEFAULT_SKILLS: &[SeedSkill] = &[
    SeedSkill { id: "cooking", name_he: "בישול" },
    SeedSkill { id: "computer", name_he: "מחשב" },
    SeedSkill { id: "drawing", name_he: "ציור" },
    SeedSkill { id: "social", name_he: "כישורים חברתיים" },
    SeedSkill { id: "cleaning", name_he: "ניקיון וארגון" },
    SeedSkill { id: "fitness", name_he: "פעילות גופנית" },
];

pub struct SeedMetric {
    pub skill_id: &'static str,
    pub metric_id: &'static str,
    pub name_he: &'static str,
    pub description_he: &'static str,
}

pub const DEFAULT_SKILL_METRICS: &[SeedMetric] = &[
    SeedMetric { skill_id: "cooking", metric_id: "teamwork", name_he: "עבודת צוות", description_he: "הקשבתי לאחרים ועזרתי לקבוצה?" },
    SeedMetric { skill_id: "cooking", metric_id: "quality", name_he: "איכות עבודה", description_he: "עקבתי אחר המתכון בקפידה?" },
    SeedMetric { skill_id: "cooking", metric_id: "responsibility", name_he: "אחריות", description_he: "ניקיתי את התחנה שלי בסיום?" },
    SeedMetric { skill_id: "computer", metric_id: "teamwork", name_he: "עבודת צוות", description_he: "שיתפתי פעולה עם אחרים?" },
    SeedMetric { skill_id: "computer", metric_id: "quality", name_he: "איכות עבודה", description_he: "השלמתי את המשימה ברמה טובה?" },
    SeedMetric { skill_id: "computer", metric_id: "responsibility", name_he: "אחריות", description_he: "שמרתי על הסדר?" },
    SeedMetric { skill_id: "drawing", metric_id: "teamwork", name_he: "עבודת צוות", description_he: "עבדתי יפה עם אחרים?" },
    SeedMetric { skill_id: "drawing", metric_id: "quality", name_he: "איכות עבודה", description_he: "השקעתי באיכות?" },
    SeedMetric { skill_id: "drawing", metric_id: "responsibility", name_he: "אחריות", description_he: "סידרתי את החומרים?" },
    SeedMetric { skill_id: "social", metric_id: "teamwork", name_he: "עבודת צוות", description_he: "הקשבתי ועזרתי?" },
    SeedMetric { skill_id: "social", metric_id: "quality", name_he: "איכות עבודה", description_he: "השתתפתי בצורה טובה?" },
    SeedMetric { skill_id: "social", metric_id: "responsibility", name_he: "אחריות", description_he: "הייתי אחראי?" },
    SeedMetric { skill_id: "cleaning", metric_id: "teamwork", name_he: "עבודת צוות", description_he: "שיתפתי פעולה בתורנות?" },
    SeedMetric { skill_id: "cleaning", metric_id: "quality", name_he: "איכות עבודה", description_he: "ביצעתי את המשימה כמו שצריך?" },
    SeedMetric { skill_id: "cleaning", metric_id: "responsibility", name_he: "אחריות", description_he: "סידרתי והשלמתי?" },
    SeedMetric { skill_id: "fitness", metric_id: "teamwork", name_he: "עבודת צוות", description_he: "עבדתי יפה עם הקבוצה?" },
    SeedMetric { skill_id: "fitness", metric_id: "quality", name_he: "איכות עבודה", description_he: "השקעתי במאמץ?" },
    SeedMetric { skill_id: "fitness", metric_id: "responsibility", name_he: "אחריות", description_he: "הופעתי והשתתפתי?" },
];

pub const DEFAULT_PLAN_TEMPLATES: &[(&str, &str)] = &[
    ("t1", "נקה את השולחן"),
    ("t2", "הצטרף לסדנאות"),
    ("t3", "שים את המעיל במקום"),
    ("t4", "תורנות צהריים"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_has_a_unique_name_and_headers() {
        for (i, a) in ALL_TABLES.iter().enumerate() {
            assert!(!a.headers.is_empty(), "{} has no headers", a.name);
            for b in &ALL_TABLES[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn skill_catalog_is_fully_covered_by_metrics() {
        for skill in DEFAULT_SKILLS {
            let count = DEFAULT_SKILL_METRICS
                .iter()
                .filter(|m| m.skill_id == skill.id)
                .count();
            assert_eq!(count, 3, "skill {} should seed 3 metrics", skill.id);
        }
    }
}
