pub mod behavior_model;
