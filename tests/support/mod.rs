pub mod liftlog_env;
pub mod stub_server;
