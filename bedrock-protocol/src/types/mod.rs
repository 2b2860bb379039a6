pub mod biome;
pub mod camera;
pub mod command;
pub mod entity;
pub mod inventory;
pub mod item;
pub mod misc;
pub mod recipe;
pub mod scoreboard;
pub mod skin;
pub mod stack_request;
