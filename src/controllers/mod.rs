pub mod advisor_controller;
