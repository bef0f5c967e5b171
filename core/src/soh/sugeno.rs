use crate::prelude::{CoreError, CoreResult};
use crate::soh::membership::MembershipFn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Health band attached to each fuzzy rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SohCategory {
    Healthy,
    Accepted,
    Weak,
    Bad,
}

impl SohCategory {
    pub const COUNT: usize = 4;
    pub const ALL: [SohCategory; SohCategory::COUNT] = [
        SohCategory::Healthy,
        SohCategory::Accepted,
        SohCategory::Weak,
        SohCategory::Bad,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            SohCategory::Healthy => "healthy",
            SohCategory::Accepted => "accepted",
            SohCategory::Weak => "weak",
            SohCategory::Bad => "bad",
        }
    }
}

impl fmt::Display for SohCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// "If R is `set` then SOH is `consequent`".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub set: MembershipFn,
    pub consequent: f64,
}

impl Rule {
    pub const fn new(set: MembershipFn, consequent: f64) -> Self {
        Self { set, consequent }
    }
}

/// Result of one inference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SohEstimate {
    /// Health score in `[0, 1]`.
    pub score: f64,
    /// Firing strength per category, indexed by [`SohCategory::index`].
    pub memberships: [f64; SohCategory::COUNT],
}

impl SohEstimate {
    /// Category with the strongest firing; the earlier category wins a tie.
    pub fn dominant(&self) -> SohCategory {
        let mut best = SohCategory::Healthy;
        for category in SohCategory::ALL {
            if self.memberships[category.index()] > self.memberships[best.index()] {
                best = category;
            }
        }
        best
    }

    pub fn membership(&self, category: SohCategory) -> f64 {
        self.memberships[category.index()]
    }

    pub fn percent(&self) -> f64 {
        self.score * 100.0
    }
}

/// Zero-order Sugeno system with one rule per [`SohCategory`].
///
/// The input bounds are finite with `input_min <= input_max`; [`SugenoSystem::new`]
/// is the only way to pick other bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SugenoSystem {
    rules: [Rule; SohCategory::COUNT],
    input_min: f64,
    input_max: f64,
}

impl SugenoSystem {
    /// `rules` are given in [`SohCategory::ALL`] order; inputs are clamped
    /// to `input_min..=input_max` before evaluation.
    pub fn new(
        rules: [Rule; SohCategory::COUNT],
        input_min: f64,
        input_max: f64,
    ) -> CoreResult<Self> {
        if !(input_min.is_finite() && input_max.is_finite() && input_min <= input_max) {
            return Err(CoreError::Range(format!(
                "input bounds {}..={} must be finite and ordered",
                input_min, input_max
            )));
        }
        Ok(Self {
            rules,
            input_min,
            input_max,
        })
    }

    /// Battery health from normalised internal resistance (ohms, 0..=15).
    pub fn battery_soh() -> Self {
        Self {
            rules: [
                Rule::new(MembershipFn::trapezoid(-4.0, -1.25, 1.25, 4.0), 1.0),
                Rule::new(MembershipFn::triangle(0.5, 3.5, 4.0), 0.7),
                Rule::new(MembershipFn::triangle(3.0, 6.0, 12.0), 0.58),
                Rule::new(MembershipFn::trapezoid(4.0, 10.0, 16.5, 28.5), 0.0),
            ],
            input_min: 0.0,
            input_max: 15.0,
        }
    }

    pub fn rules(&self) -> &[Rule; SohCategory::COUNT] {
        &self.rules
    }

    pub fn rule(&self, category: SohCategory) -> &Rule {
        &self.rules[category.index()]
    }

    pub fn infer(&self, input: f64) -> CoreResult<SohEstimate> {
        let x = input.clamp(self.input_min, self.input_max);

        let mut memberships = [0.0; SohCategory::COUNT];
        for (slot, rule) in memberships.iter_mut().zip(self.rules.iter()) {
            *slot = rule.set.degree(x);
        }

        let total: f64 = memberships.iter().sum();
        if total <= 0.0 {
            return Err(CoreError::InferenceUndefined);
        }
        let weighted: f64 = memberships
            .iter()
            .zip(self.rules.iter())
            .map(|(weight, rule)| weight * rule.consequent)
            .sum();

        Ok(SohEstimate {
            score: weighted / total,
            memberships,
        })
    }
}
