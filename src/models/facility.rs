use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Building {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Floor {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub building_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<Box<Building>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Department {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub head: String,
    pub address: String,
    pub floor_id: i64,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<Box<Floor>>,
}
