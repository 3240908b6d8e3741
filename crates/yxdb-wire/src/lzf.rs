use crate::error::WireError;

/// Control bytes below this value start a literal run.
const LITERAL_LIMIT: usize = 1 << 5;

/// Back-reference length value that signals an extra length byte.
const EXTENDED_LENGTH: usize = 7;

/// Decompress one LZF block into `output`.
///
/// `output.len()` is the destination capacity. The token stream is a
/// sequence of control-byte-prefixed tokens:
///
/// ```text
/// ┌────────────────────┬──────────────────────────────────────────────┐
/// │ ctrl               │ Token                                        │
/// ├────────────────────┼──────────────────────────────────────────────┤
/// │ 000LLLLL           │ literal run of L+1 bytes that follow         │
/// │ LLLhhhhh [ext] lo  │ copy L+2 bytes from distance (h<<8 | lo) + 1 │
/// │                    │ L == 7 adds the ext byte to L                │
/// └────────────────────┴──────────────────────────────────────────────┘
/// ```
///
/// A back-reference may overlap the bytes it produces (distance smaller
/// than the run); those copies go byte by byte so a run can repeat its own
/// output. Copies whose source ends before the write position use a bulk
/// `copy_within`.
///
/// # Returns
///
/// The number of bytes written to `output`.
///
/// # Errors
///
/// - [`WireError::OutputTooSmall`] if a token would write past the end of
///   `output`. Checked before the token is applied.
/// - [`WireError::InvalidBackReference`] if a back-reference reaches before
///   the start of `output`.
/// - [`WireError::TruncatedBlock`] if a token needs more input than remains.
pub fn decompress(input: &[u8], output: &mut [u8]) -> Result<usize, WireError> {
    let capacity = output.len();
    let mut ip = 0;
    let mut op = 0;

    while ip < input.len() {
        let ctrl = usize::from(input[ip]);
        ip += 1;

        if ctrl < LITERAL_LIMIT {
            let run = ctrl + 1;
            if op + run > capacity {
                return Err(WireError::OutputTooSmall {
                    needed: op + run,
                    capacity,
                });
            }
            let literal = input
                .get(ip..ip + run)
                .ok_or(WireError::TruncatedBlock { offset: input.len() })?;
            output[op..op + run].copy_from_slice(literal);
            ip += run;
            op += run;
            continue;
        }

        let mut len = ctrl >> 5;
        if len == EXTENDED_LENGTH {
            len += usize::from(next_byte(input, ip)?);
            ip += 1;
        }
        let distance = ((ctrl & 0x1F) << 8) + usize::from(next_byte(input, ip)?) + 1;
        ip += 1;

        let run = len + 2;
        if op + run > capacity {
            return Err(WireError::OutputTooSmall {
                needed: op + run,
                capacity,
            });
        }
        let Some(reference) = op.checked_sub(distance) else {
            return Err(WireError::InvalidBackReference {
                position: op,
                distance,
            });
        };

        if reference + run < op {
            output.copy_within(reference..reference + run, op);
        } else {
            for i in 0..run {
                output[op + i] = output[reference + i];
            }
        }
        op += run;
    }

    Ok(op)
}

fn next_byte(input: &[u8], ip: usize) -> Result<u8, WireError> {
    input
        .get(ip)
        .copied()
        .ok_or(WireError::TruncatedBlock { offset: ip })
}
