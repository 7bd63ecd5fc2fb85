use crate::models::HabitCategory;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalDirection {
    /// Met when the logged amount reaches the target.
    AtLeast,
    /// Met while the logged amount stays under the target.
    AtMost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTier {
    Good,
    Warning,
    Below,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGoal {
    pub category: HabitCategory,
    pub target: f64,
    pub unit: &'static str,
    pub direction: GoalDirection,
    /// Ceiling for any logged value.
    pub max: f64,
    /// Quick-adjust increment.
    pub step: f64,
    pub color: &'static str,
}

impl CategoryGoal {
    pub fn default_for(category: HabitCategory) -> Self {
        match category {
            HabitCategory::Water => Self {
                category,
                target: 8.0,
                unit: "glasses",
                direction: GoalDirection::AtLeast,
                max: category.max_value(),
                step: 1.0,
                color: "#3b82f6",
            },
            HabitCategory::Sleep => Self {
                category,
                target: 8.0,
                unit: "hours",
                direction: GoalDirection::AtLeast,
                max: category.max_value(),
                step: 0.5,
                color: "#8b5cf6",
            },
            HabitCategory::Screen => Self {
                category,
                target: 2.0,
                unit: "hours",
                direction: GoalDirection::AtMost,
                max: category.max_value(),
                step: 1.0,
                color: "#f59e0b",
            },
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return 0.0;
        }
        value.clamp(0.0, self.max)
    }

    /// Progress toward the goal in percent, uncapped for at-least goals.
    pub fn progress(&self, value: f64) -> f64 {
        if self.target <= 0.0 {
            return 100.0;
        }
        match self.direction {
            GoalDirection::AtLeast => value / self.target * 100.0,
            GoalDirection::AtMost if value <= self.target => 100.0,
            GoalDirection::AtMost => self.target / value * 100.0,
        }
    }

    pub fn is_met(&self, value: f64) -> bool {
        match self.direction {
            GoalDirection::AtLeast => value >= self.target,
            GoalDirection::AtMost => value <= self.target,
        }
    }

    pub fn classify(&self, value: f64) -> StatusTier {
        classify(self.direction, value, self.target)
    }
}

/// Three-tier status used for calendar bars and dashboard cards.
pub fn classify(direction: GoalDirection, value: f64, goal: f64) -> StatusTier {
    match direction {
        GoalDirection::AtLeast if value >= goal => StatusTier::Good,
        GoalDirection::AtLeast if value >= goal * 0.7 => StatusTier::Warning,
        GoalDirection::AtLeast => StatusTier::Below,
        GoalDirection::AtMost if value <= goal => StatusTier::Good,
        GoalDirection::AtMost if value > goal * 1.5 => StatusTier::Below,
        GoalDirection::AtMost => StatusTier::Warning,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalTable {
    water: CategoryGoal,
    sleep: CategoryGoal,
    screen: CategoryGoal,
}

impl Default for GoalTable {
    fn default() -> Self {
        Self {
            water: CategoryGoal::default_for(HabitCategory::Water),
            sleep: CategoryGoal::default_for(HabitCategory::Sleep),
            screen: CategoryGoal::default_for(HabitCategory::Screen),
        }
    }
}

impl GoalTable {
    pub fn get(&self, category: HabitCategory) -> &CategoryGoal {
        match category {
            HabitCategory::Water => &self.water,
            HabitCategory::Sleep => &self.sleep,
            HabitCategory::Screen => &self.screen,
        }
    }

    /// Overrides a target; non-positive or non-finite targets are ignored.
    pub fn with_target(mut self, category: HabitCategory, target: f64) -> Self {
        if target.is_finite() && target > 0.0 {
            let goal = match category {
                HabitCategory::Water => &mut self.water,
                HabitCategory::Sleep => &mut self.sleep,
                HabitCategory::Screen => &mut self.screen,
            };
            goal.target = target.min(goal.max);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryGoal> {
        [&self.water, &self.sleep, &self.screen].into_iter()
    }
}
