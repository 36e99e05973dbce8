pub mod advisor_routes;
