use super::{Reply, command::Command, error::ControlChanError, line_parser};

use bytes::BytesMut;
use std::io::Write;
use tokio_util::codec::{Decoder, Encoder};

// FtpCodec implements tokio's `Decoder` and `Encoder` traits for the control channel, that we'll
// use to decode FTP commands and encode their responses.
pub struct FtpCodec {
    // Stored index of the next index to examine for a '\n' character. This is used to optimize
    // searching. For example, if `decode` was called with `abc`, it would hold `3`, because that
    // is the next index to examine. The next time `decode` is called with `abcde\n`, we will only
    // look at `de\n` before returning.
    next_index: usize,
}

impl FtpCodec {
    pub fn new() -> Self {
        FtpCodec { next_index: 0 }
    }
}

// A line that doesn't parse is handed out as an item rather than returned as a decoder error.
// `Framed` treats decoder errors as fatal to the stream while a bad command should only cost the
// client an error reply.
impl Decoder for FtpCodec {
    type Item = Result<Command, ControlChanError>;
    type Error = ControlChanError;

    // Here we decode the incoming bytes into a meaningful command. We'll split on newlines, and
    // parse the resulting line using `line_parser::parse()`. This method will be called by tokio.
    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(newline_offset) = buf[self.next_index..].iter().position(|b| *b == b'\n') {
            let newline_index = newline_offset + self.next_index;
            let line = buf.split_to(newline_index + 1);
            self.next_index = 0;
            Ok(Some(line_parser::parse(line).map_err(ControlChanError::from)))
        } else {
            self.next_index = buf.len();
            Ok(None)
        }
    }
}

impl Encoder<Reply> for FtpCodec {
    type Error = ControlChanError;

    // Here we encode the outgoing response
    fn encode(&mut self, reply: Reply, buf: &mut BytesMut) -> Result<(), Self::Error> {
        let mut buffer = vec![];
        match reply {
            Reply::None => {
                return Ok(());
            }
            Reply::CodeAndMsg { code, msg } => {
                if msg.is_empty() {
                    write!(buffer, "{}\r\n", code as u32)?;
                } else {
                    write!(buffer, "{} {}\r\n", code as u32, msg)?;
                }
            }
            Reply::MultiLine { code, mut lines } => {
                // Get the last line since it needs to be preceded by the response code.
                let last_line = lines.pop().unwrap_or_default();

                // Lines starting with a digit should be indented
                for it in lines.iter_mut() {
                    if it.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                        it.insert(0, ' ');
                    }
                }
                if lines.is_empty() {
                    write!(buffer, "{} {}\r\n", code as u32, last_line)?;
                } else {
                    write!(buffer, "{}-{}\r\n{} {}\r\n", code as u32, lines.join("\r\n"), code as u32, last_line)?;
                }
            }
        }
        buf.extend(&buffer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::controlchan::{ReplyCode, error::ControlChanErrorKind};
    use pretty_assertions::assert_eq;

    fn encode(reply: Reply) -> String {
        let mut buf = BytesMut::new();
        FtpCodec::new().encode(reply, &mut buf).unwrap();
        String::from_utf8(buf.to_vec()).unwrap()
    }

    fn decode(codec: &mut FtpCodec, buf: &mut BytesMut) -> Option<Result<Command, ControlChanErrorKind>> {
        codec.decode(buf).unwrap().map(|item| item.map_err(|e| *e.kind()))
    }

    #[test]
    fn decodes_lines_as_they_complete() {
        let mut codec = FtpCodec::new();
        let mut buf = BytesMut::from("PW");
        assert_eq!(decode(&mut codec, &mut buf), None);
        buf.extend_from_slice(b"D\r\nNOOP\n");
        assert_eq!(decode(&mut codec, &mut buf), Some(Ok(Command::Pwd)));
        assert_eq!(decode(&mut codec, &mut buf), Some(Ok(Command::Noop)));
        assert_eq!(decode(&mut codec, &mut buf), None);
    }

    #[test]
    fn bad_line_is_consumed_and_reported() {
        let mut codec = FtpCodec::new();
        let mut buf = BytesMut::from("CWD\r\nPWD\r\n");
        assert_eq!(decode(&mut codec, &mut buf), Some(Err(ControlChanErrorKind::InvalidCommand)));
        assert_eq!(decode(&mut codec, &mut buf), Some(Ok(Command::Pwd)));
    }

    #[test]
    fn encodes_single_line() {
        assert_eq!(encode(Reply::from_code(ReplyCode::CommandOkay)), "200 Command okay.\r\n");
        assert_eq!(encode(Reply::new(ReplyCode::ClosingDataConnection, "")), "226\r\n");
        assert_eq!(encode(Reply::none()), "");
    }

    #[test]
    fn encodes_multi_line() {
        let reply = Reply::new_multiline(ReplyCode::HelpMessage, vec!["Commands:", "123 indented", "End"]);
        assert_eq!(encode(reply), "214-Commands:\r\n 123 indented\r\n214 End\r\n");
    }
}
