// handlers/elevated/mod.rs - Elevated handlers (admin broker required)
//
// Security Level: JWT + active broker profile + admin role
// Route Prefix: /api/admin/*
// Middleware: jwt_auth_middleware → validate_user_middleware → require_admin
//
// List, show and update of broker profiles reuse the generic record handlers;
// creation and account state live here. The handlers re-check the role
// through the portal layer, so they stay safe if mounted elsewhere.

pub mod brokers;
