//! Inter-stage state
//!
//! An immutable context accumulated through a consuming builder: each
//! stage's output lands in its own typed optional field. Downstream
//! stages read exactly the fields they declare, which is what gives the
//! coordinator its ordering guarantee.

use crate::domain::{
    ActivityOption, BudgetBreakdown, DiningOption, LodgingOption, StageKind, StageOutput, TripPlan, TripRequest,
};

use super::transport::TransportOutput;

/// Accumulated stage outputs for one pipeline run
#[derive(Debug, Clone, Default)]
pub struct StageContext {
    pub lodging: Option<StageOutput<LodgingOption>>,
    pub dining: Option<StageOutput<DiningOption>>,
    pub transport: Option<TransportOutput>,
    pub activities: Option<StageOutput<ActivityOption>>,
    pub budget: Option<BudgetBreakdown>,
}

impl StageContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a context from a published plan, for follow-up runs that
    /// replace one stage and keep the rest
    pub fn from_plan(plan: &TripPlan) -> Self {
        let lodging = StageOutput::new(StageKind::Lodging, plan.lodging.clone(), String::new(), 1);
        let dining = StageOutput::new(StageKind::Dining, plan.dining.clone(), String::new(), 1);
        let activities = StageOutput::new(StageKind::Activities, plan.activities.clone(), String::new(), 1);

        Self {
            lodging: Some(lodging),
            dining: Some(dining),
            transport: Some(TransportOutput::from_plan(plan)),
            activities: Some(activities),
            budget: Some(plan.budget.clone()),
        }
    }

    pub fn with_lodging(mut self, output: StageOutput<LodgingOption>) -> Self {
        self.lodging = Some(output);
        self
    }

    pub fn with_dining(mut self, output: StageOutput<DiningOption>) -> Self {
        self.dining = Some(output);
        self
    }

    pub fn with_transport(mut self, output: TransportOutput) -> Self {
        self.transport = Some(output);
        self
    }

    pub fn with_activities(mut self, output: StageOutput<ActivityOption>) -> Self {
        self.activities = Some(output);
        self
    }

    pub fn with_budget(mut self, budget: BudgetBreakdown) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn lodging_records(&self) -> &[LodgingOption] {
        self.lodging.as_ref().map(|o| o.records.as_slice()).unwrap_or(&[])
    }

    pub fn dining_records(&self) -> &[DiningOption] {
        self.dining.as_ref().map(|o| o.records.as_slice()).unwrap_or(&[])
    }

    pub fn activity_records(&self) -> &[ActivityOption] {
        self.activities.as_ref().map(|o| o.records.as_slice()).unwrap_or(&[])
    }

    /// The lodging the traveler picked, falling back to the first option
    pub fn selected_lodging(&self, request: &TripRequest) -> Option<&LodgingOption> {
        let records = self.lodging_records();
        if let Some(id) = &request.selected_lodging_id {
            if let Some(found) = records.iter().find(|l| &l.id == id) {
                return Some(found);
            }
        }
        records.first()
    }
}
