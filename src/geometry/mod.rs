pub mod edge_locator;
pub mod heading;
pub mod intersection;
pub mod lane;
pub mod road;
pub mod road_builder;
pub mod road_node;
