use ldpclink::input::hex_string;
use ldpclink_session::{DEFAULT_BLOCK_TIMEOUT, DEFAULT_PARAMETER_TIMEOUT, DEFAULT_SYNC_TIMEOUT};
use ldpclink_transport::{DEFAULT_BAUD, DEFAULT_INTER_BYTE_DELAY};
use ldpclink_wire::SYNC_TAG;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("ldpclink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: ldpclink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("LDPCLINK_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("features: serial={}, cli=true", cfg!(feature = "serial"));
    println!("sync_tag: {}", hex_string(&SYNC_TAG));
    println!("default_baud: {DEFAULT_BAUD}");
    println!("inter_byte_delay: {DEFAULT_INTER_BYTE_DELAY:?}");
    println!(
        "timeouts: sync={DEFAULT_SYNC_TIMEOUT:?}, parameters={DEFAULT_PARAMETER_TIMEOUT:?}, block={DEFAULT_BLOCK_TIMEOUT:?}"
    );

    Ok(SUCCESS)
}
