use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    SameRoute,
    Sequence,
    Order,
    Shipment,
    Meetup,
    ForceFirst,
    NeverFirst,
    ForceEnd,
    MinimumDayLapse,
    MaximumDayLapse,
    MinimumDurationLapse,
    MaximumDurationLapse,
    VehicleGroupDuration,
    VehicleGroupDurationOnWeeks,
    VehicleGroupDurationOnMonths,
    VehicleGroupNumber,
    VehicleTrips,
}

impl RelationType {
    /// Relations tying several vehicles together, they must end up in the same sub-problem
    pub fn binds_vehicles(&self) -> bool {
        matches!(
            self,
            RelationType::VehicleGroupDuration
                | RelationType::VehicleGroupDurationOnWeeks
                | RelationType::VehicleGroupDurationOnMonths
                | RelationType::VehicleGroupNumber
                | RelationType::VehicleTrips
        )
    }

    pub fn survives_zip_cluster(&self) -> bool {
        self.binds_vehicles()
            || matches!(
                self,
                RelationType::MinimumDayLapse
                    | RelationType::MaximumDayLapse
                    | RelationType::MinimumDurationLapse
                    | RelationType::MaximumDurationLapse
            )
    }
}

impl Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RelationType::SameRoute => "same_route",
                RelationType::Sequence => "sequence",
                RelationType::Order => "order",
                RelationType::Shipment => "shipment",
                RelationType::Meetup => "meetup",
                RelationType::ForceFirst => "force_first",
                RelationType::NeverFirst => "never_first",
                RelationType::ForceEnd => "force_end",
                RelationType::MinimumDayLapse => "minimum_day_lapse",
                RelationType::MaximumDayLapse => "maximum_day_lapse",
                RelationType::MinimumDurationLapse => "minimum_duration_lapse",
                RelationType::MaximumDurationLapse => "maximum_duration_lapse",
                RelationType::VehicleGroupDuration => "vehicle_group_duration",
                RelationType::VehicleGroupDurationOnWeeks => "vehicle_group_duration_on_weeks",
                RelationType::VehicleGroupDurationOnMonths => "vehicle_group_duration_on_months",
                RelationType::VehicleGroupNumber => "vehicle_group_number",
                RelationType::VehicleTrips => "vehicle_trips",
            }
        )
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Relation {
    relation_type: RelationType,
    /// Days or seconds depending on the type
    lapse: Option<i64>,
    linked_ids: Vec<String>,
    linked_vehicle_ids: Vec<String>,
}

impl Relation {
    pub fn new(relation_type: RelationType, linked_ids: Vec<String>) -> Self {
        Relation {
            relation_type,
            lapse: None,
            linked_ids,
            linked_vehicle_ids: Vec::new(),
        }
    }

    pub fn on_vehicles(relation_type: RelationType, linked_vehicle_ids: Vec<String>) -> Self {
        Relation {
            relation_type,
            lapse: None,
            linked_ids: Vec::new(),
            linked_vehicle_ids,
        }
    }

    pub fn with_linked_vehicle_ids(mut self, linked_vehicle_ids: Vec<String>) -> Self {
        self.linked_vehicle_ids = linked_vehicle_ids;
        self
    }

    pub fn with_lapse(mut self, lapse: i64) -> Self {
        self.lapse = Some(lapse);
        self
    }

    pub fn relation_type(&self) -> RelationType {
        self.relation_type
    }

    pub fn lapse(&self) -> Option<i64> {
        self.lapse
    }

    pub fn linked_ids(&self) -> &[String] {
        &self.linked_ids
    }

    pub fn linked_vehicle_ids(&self) -> &[String] {
        &self.linked_vehicle_ids
    }
}
