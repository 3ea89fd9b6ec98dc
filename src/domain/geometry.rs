// src/domain/geometry.rs

/// Store coordinates are a local planar projection in feet.
pub const FEET_PER_MILE: f64 = 5280.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

pub fn miles_to_feet(miles: f64) -> f64 {
    miles * FEET_PER_MILE
}

pub fn feet_to_miles(feet: f64) -> f64 {
    feet / FEET_PER_MILE
}
