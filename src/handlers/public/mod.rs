// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Route Prefix: /, /health, /api/site/*
// Middleware: locale resolution only (applied to every route)

pub mod site;
pub mod status;
