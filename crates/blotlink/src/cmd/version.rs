use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("blotlink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: blotlink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("BLOTLINK_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "rustc: {}",
        option_env!("RUSTC_VERSION").unwrap_or("unknown")
    );
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "default_baud: {}",
        blotlink_transport::DEFAULT_BAUD_RATE
    );
    println!(
        "max_frame_len: {}",
        blotlink_frame::MAX_FRAME_LEN
    );
    println!(
        "features: queue={}, async={}, cli=true",
        cfg!(feature = "queue"),
        cfg!(feature = "async")
    );

    Ok(SUCCESS)
}
