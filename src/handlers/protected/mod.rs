// handlers/protected/mod.rs - Protected handlers (broker JWT required)
//
// Security Level: JWT + active broker profile
// Route Prefix: /api/portal/*
// Middleware: jwt_auth_middleware → validate_user_middleware
//
// Clients, applications and lenders share the generic record handlers in
// `records`; applications add a joined detail view and document attachments.

pub mod applications;
pub mod documents;
pub mod me;
pub mod records;
