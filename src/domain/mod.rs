pub mod address;
pub mod geometry;
pub mod normalize;
pub mod occupancy;
pub mod parcel;
