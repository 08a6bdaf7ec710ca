use crate::calendar::CalendarDay;
use crate::schedule_time::{ScheduleParseError, ScheduleTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("unknown category '{0}' (expected Neck, Shoulder, Back or Legs)")]
    UnknownCategory(String),
    #[error("unknown difficulty '{0}' (expected Easy, Medium or Hard)")]
    UnknownDifficulty(String),
    #[error(transparent)]
    Schedule(#[from] ScheduleParseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Neck,
    Shoulder,
    Back,
    Legs,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Neck,
        Category::Shoulder,
        Category::Back,
        Category::Legs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Neck => "Neck",
            Category::Shoulder => "Shoulder",
            Category::Back => "Back",
            Category::Legs => "Legs",
        }
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownDifficulty(s.to_string()))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minutes as a number, or free text such as "2 min".
///
/// Numbers keep their JSON form, so a stored `5` is written back as `5`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExerciseDuration {
    Minutes(serde_json::Number),
    Text(String),
}

impl ExerciseDuration {
    fn is_blank(&self) -> bool {
        match self {
            ExerciseDuration::Minutes(minutes) => minutes
                .as_f64()
                .is_none_or(|minutes| !minutes.is_finite() || minutes <= 0.0),
            ExerciseDuration::Text(text) => text.trim().is_empty(),
        }
    }
}

impl fmt::Display for ExerciseDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseDuration::Minutes(minutes) => write!(f, "{minutes} min"),
            ExerciseDuration::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "duration")]
    pub duration_minutes: ExerciseDuration,
    #[serde(alias = "schedule", default, skip_serializing_if = "Option::is_none")]
    pub schedule_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

impl Exercise {
    pub fn new(id: i64, name: impl Into<String>, duration: ExerciseDuration) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            duration_minutes: duration,
            schedule_time: None,
            category: None,
            difficulty: None,
        }
    }

    /// The parsed schedule, if one is set and readable.
    pub fn schedule(&self) -> Option<Result<ScheduleTime, ScheduleParseError>> {
        self.schedule_time
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(str::parse)
    }
}

/// Exercises that come with a fresh store.
pub fn sample_exercises() -> Vec<Exercise> {
    let sample = |id, name: &str, description: &str, duration: &str| Exercise {
        description: description.to_string(),
        ..Exercise::new(id, name, ExerciseDuration::Text(duration.to_string()))
    };
    vec![
        sample(1, "Neck Stretch", "Gently tilt head side to side", "2 min"),
        sample(
            2,
            "Shoulder Roll",
            "Rotate shoulders clockwise & anti-clockwise",
            "3 min",
        ),
        sample(
            3,
            "Leg Raise",
            "Raise one leg at a time while lying down",
            "5 min",
        ),
    ]
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

fn validate_schedule(raw: &Option<String>) -> Result<Option<String>, ValidationError> {
    match raw.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => {
            value.parse::<ScheduleTime>()?;
            Ok(Some(value.to_string()))
        }
        _ => Ok(None),
    }
}

/// Body of an exercise creation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExercise {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "duration", default)]
    pub duration_minutes: Option<ExerciseDuration>,
    #[serde(alias = "schedule", default)]
    pub schedule_time: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub difficulty: Option<Difficulty>,
}

impl NewExercise {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField("description"));
        }
        match &self.duration_minutes {
            Some(duration) if !duration.is_blank() => {}
            _ => return Err(ValidationError::MissingField("durationMinutes")),
        }
        if self.category.is_none() {
            return Err(ValidationError::MissingField("category"));
        }
        validate_schedule(&self.schedule_time)?;
        Ok(())
    }

    pub fn into_exercise(self, id: i64) -> Result<Exercise, ValidationError> {
        self.validate()?;
        let schedule_time = validate_schedule(&self.schedule_time)?;
        let duration_minutes = self
            .duration_minutes
            .ok_or(ValidationError::MissingField("durationMinutes"))?;
        Ok(Exercise {
            id,
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            duration_minutes,
            schedule_time,
            category: self.category,
            difficulty: self.difficulty,
        })
    }
}

/// Partial update of an exercise. Absent fields are left alone; an empty
/// schedule clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "duration", default)]
    pub duration_minutes: Option<ExerciseDuration>,
    #[serde(alias = "schedule", default)]
    pub schedule_time: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub difficulty: Option<Difficulty>,
}

impl ExercisePatch {
    pub fn apply(&self, exercise: &mut Exercise) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ValidationError::MissingField("name"));
            }
        }
        if let Some(duration) = &self.duration_minutes {
            if duration.is_blank() {
                return Err(ValidationError::MissingField("durationMinutes"));
            }
        }
        let schedule_time = match &self.schedule_time {
            Some(_) => Some(validate_schedule(&self.schedule_time)?),
            None => None,
        };

        if let Some(name) = &self.name {
            exercise.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            exercise.description = description.trim().to_string();
        }
        if let Some(duration) = &self.duration_minutes {
            exercise.duration_minutes = duration.clone();
        }
        if let Some(schedule_time) = schedule_time {
            exercise.schedule_time = schedule_time;
        }
        if let Some(category) = self.category {
            exercise.category = Some(category);
        }
        if let Some(difficulty) = self.difficulty {
            exercise.difficulty = Some(difficulty);
        }
        Ok(())
    }
}

/// Category/difficulty filter for exercise listings. `All` or blank means
/// no constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExerciseFilter {
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
}

impl ExerciseFilter {
    pub fn parse(
        category: Option<&str>,
        difficulty: Option<&str>,
    ) -> Result<Self, ValidationError> {
        fn constraint<T: FromStr<Err = ValidationError>>(
            raw: Option<&str>,
        ) -> Result<Option<T>, ValidationError> {
            match raw.map(str::trim) {
                None | Some("") => Ok(None),
                Some(value) if value.eq_ignore_ascii_case("all") => Ok(None),
                Some(value) => value.parse().map(Some),
            }
        }
        Ok(Self {
            category: constraint(category)?,
            difficulty: constraint(difficulty)?,
        })
    }

    pub fn matches(&self, exercise: &Exercise) -> bool {
        self.category.is_none_or(|c| exercise.category == Some(c))
            && self.difficulty.is_none_or(|d| exercise.difficulty == Some(d))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: i64,
    pub exercise_id: i64,
    pub schedule_time: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScheduleEntry {
    pub exercise_id: i64,
    #[serde(default)]
    pub schedule_time: String,
}

impl NewScheduleEntry {
    pub fn into_entry(self, id: i64) -> Result<ScheduleEntry, ValidationError> {
        let schedule_time = validate_schedule(&Some(self.schedule_time))?
            .ok_or(ValidationError::MissingField("scheduleTime"))?;
        Ok(ScheduleEntry {
            id,
            exercise_id: self.exercise_id,
            schedule_time,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntryPatch {
    #[serde(default)]
    pub exercise_id: Option<i64>,
    #[serde(default)]
    pub schedule_time: Option<String>,
}

impl ScheduleEntryPatch {
    pub fn apply(&self, entry: &mut ScheduleEntry) -> Result<(), ValidationError> {
        if let Some(raw) = &self.schedule_time {
            entry.schedule_time = validate_schedule(&Some(raw.clone()))?
                .ok_or(ValidationError::MissingField("scheduleTime"))?;
        }
        if let Some(exercise_id) = self.exercise_id {
            entry.exercise_id = exercise_id;
        }
        Ok(())
    }
}

/// One completed exercise on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub id: i64,
    pub exercise_id: i64,
    pub date: CalendarDay,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProgressEntry {
    pub exercise_id: i64,
    /// Defaults to the current day when omitted.
    #[serde(default)]
    pub date: Option<CalendarDay>,
}
