use std::str::FromStr;
use std::fmt::Display;
use serde::{Deserialize, Serialize};

/// Object categories counted as vehicles, with their COCO class ids.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum VehicleClass {
    Car,
    Motorcycle,
    Bus,
    Truck,
}

pub const VEHICLE_CLASSES: [VehicleClass; 4] = [VehicleClass::Car, VehicleClass::Motorcycle, VehicleClass::Bus, VehicleClass::Truck];

impl VehicleClass {
    pub fn class_id(&self) -> usize {
        match self {
            VehicleClass::Car => 2,
            VehicleClass::Motorcycle => 3,
            VehicleClass::Bus => 5,
            VehicleClass::Truck => 7,
        }
    }

    pub fn from_class_id(class_id: usize) -> Option<Self> {
        match class_id {
            2 => Some(VehicleClass::Car),
            3 => Some(VehicleClass::Motorcycle),
            5 => Some(VehicleClass::Bus),
            7 => Some(VehicleClass::Truck),
            _ => None,
        }
    }

    pub fn is_vehicle(class_id: usize) -> bool {
        Self::from_class_id(class_id).is_some()
    }
}

impl FromStr for VehicleClass {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Car" => Ok(VehicleClass::Car),
            "Motorcycle" => Ok(VehicleClass::Motorcycle),
            "Bus" => Ok(VehicleClass::Bus),
            "Truck" => Ok(VehicleClass::Truck),
            _ => Err(()),
        }
    }
}

impl Display for VehicleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            VehicleClass::Car => "Car",
            VehicleClass::Motorcycle => "Motorcycle",
            VehicleClass::Bus => "Bus",
            VehicleClass::Truck => "Truck",
        })
    }
}
