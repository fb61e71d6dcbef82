use curlsharp::context::Environment;
use curlsharp::core;
use curlsharp::status::ExitStatus;

fn main() -> ExitStatus {
    let args: Vec<String> = std::env::args().collect();
    let env = Environment::init();

    core::run(args, env)
}
