use crcframe_codec::{MAX_PAYLOAD, PROTOCOL_VERSION};
use crcframe_session::CHECK_COUNT;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("crcframe {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: crcframe");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("protocol_version: 0x{PROTOCOL_VERSION:02X}");
    println!("max_payload: {MAX_PAYLOAD}");
    println!("self_checks: {CHECK_COUNT}");
    println!(
        "target: {}",
        option_env!("CRCFRAME_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("CRCFRAME_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!(
        "features: session=true, async={}, cli=true",
        cfg!(feature = "async")
    );

    Ok(SUCCESS)
}
