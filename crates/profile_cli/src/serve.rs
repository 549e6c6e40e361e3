//! Line-delimited JSON request loop.
//!
//! Each input line is one `RpcRequest`; each output line is the matching
//! reply. Blank lines are skipped. A line that does not parse yields a 400
//! reply and the loop keeps going.

use log::warn;
use profile_core::{status, ProfileService, ProfileStore, RpcReply, RpcRequest, UserProfileReply};
use std::io::{self, BufRead, Write};

/// Serves requests until `input` is exhausted. Returns the number of
/// replies written.
pub fn serve<S: ProfileStore>(
    service: &ProfileService<S>,
    input: impl BufRead,
    mut output: impl Write,
) -> io::Result<usize> {
    let mut served = 0;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<RpcRequest>(&line) {
            Ok(request) => service.handle(&request),
            Err(err) => {
                warn!("event=rpc_decode module=cli status=error error={err}");
                RpcReply::Status(UserProfileReply::new(
                    status::BAD_REQUEST,
                    format!("Malformed request: {err}"),
                ))
            }
        };

        serde_json::to_writer(&mut output, &reply)?;
        output.write_all(b"\n")?;
        output.flush()?;
        served += 1;
    }
    Ok(served)
}
