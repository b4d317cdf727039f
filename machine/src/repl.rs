//! Serve the command bus over a pair of byte streams, one frame per
//! line.
use std::io::{self, BufRead, Write};

use tracing::{Level, event};

use base::wire::READY_MARKER;

use crate::colossus::Colossus;

/// Announce readiness, then answer each frame read from `input` until
/// it is exhausted.  Returns the number of frames handled.
pub fn serve<R, W>(machine: &mut Colossus, input: R, mut output: W) -> io::Result<usize>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "{READY_MARKER}")?;
    output.flush()?;
    let mut handled: usize = 0;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match machine.execute_frame(&line) {
            Ok(response) => writeln!(output, "{}", response.line())?,
            Err(e) => {
                event!(Level::WARN, "{e}");
                writeln!(output, "{e}")?;
            }
        }
        output.flush()?;
        handled += 1;
    }
    event!(Level::INFO, "input closed after {handled} frames");
    Ok(handled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve() {
        let mut machine = Colossus::new();
        let input = b"0812\n\n18\n05\nzz\n".as_slice();
        let mut output: Vec<u8> = Vec::new();
        assert_eq!(serve(&mut machine, input, &mut output).unwrap(), 4);
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "READY-FOR-INPUT",
                "COLOSSUS-RESPONSE: 0812 '0' 3",
                "COLOSSUS-RESPONSE: 18 '0' 9",
                "COLOSSUS-RESPONSE: 05 '0' 5",
                "malformed command frame 'zz'",
            ]
        );
    }
}
