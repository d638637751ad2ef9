use std::env;

use mimalloc::MiMalloc;
use movie_scout_server::start_server;
use structopt::StructOpt;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const RUST_LOG: &str = "RUST_LOG";

fn main() -> anyhow::Result<()> {
    if env::var_os(RUST_LOG).is_none() {
        env::set_var(
            RUST_LOG,
            "warn,movie_scout_server=debug,tower_http=info,hyper=info",
        );
    }
    tracing_subscriber::fmt::init();
    println!("Log level: {:?}", env::var_os(RUST_LOG).unwrap());

    let opts = Opts::from_args();
    start_server(&opts.base, opts.async_threads, opts.io_threads, opts.port)
}

#[derive(StructOpt)]
#[structopt(name = "movie_scout_server", about = "Usage of movie scout server")]
struct Opts {
    #[structopt(short = "p", long = "port", default_value = "3000")]
    port: u16,
    #[structopt(short = "b", long = "base", default_value = "https://vegamovies.bh")]
    base: String,
    #[structopt(long = "async-threads", default_value = "4")]
    async_threads: usize,
    #[structopt(long = "io-threads", default_value = "16")]
    io_threads: usize,
}
