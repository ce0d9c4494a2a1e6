mod kv;
pub use kv::KeyValue;

mod command_line;
pub use command_line::CommandLine;

mod launch_env;
pub use launch_env::LaunchEnv;
