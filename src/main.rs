use std::io::{self, Write};
use std::process;

use clap::Parser;
use env_logger::Builder;
use log::{error, LevelFilter};

use agileftp::transport::DEFAULT_PORT;
use agileftp::{FtpTransport, Shell};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "agileftp", about = "An interactive FTP client.", version)]
struct Cli {
    /// Control port used when the hostname does not carry one
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Stop prompting after this many failed logins (default: never)
    #[arg(long)]
    max_login_attempts: Option<u32>,

    /// More log output on stderr; repeat for protocol traces
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    Builder::new()
        .filter_level(level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

fn main() {
    let args = Cli::parse();
    init_logger(args.verbose);

    let stdin = io::stdin();
    let mut shell =
        Shell::new(stdin.lock(), io::stdout()).max_login_attempts(args.max_login_attempts);

    let port = args.port;
    let result = match shell.login(|| FtpTransport::new(port)) {
        Ok(Some(mut session)) => shell.run(&mut session),
        Ok(None) => Ok(()),
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        error!("{}", err);
        process::exit(1);
    }
}
