// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! User profile used for calorie and stride estimates.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

/// Body measurements and daily goals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub gender: Gender,
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: u32,
    /// Daily calorie goal (kcal)
    pub daily_calories_goal: u32,
    pub daily_steps_goal: u32,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            age: 25,
            weight_kg: 70.0,
            height_cm: 175,
            daily_calories_goal: 500,
            daily_steps_goal: 6000,
        }
    }
}

impl UserProfile {
    /// A profile is usable for estimates once age, weight and height are set.
    pub fn is_complete(&self) -> bool {
        self.age > 0 && self.weight_kg > 0.0 && self.height_cm > 0
    }
}
