//! One-shot SMTP server for tests. Accepts a single session on an ephemeral
//! port, advertises STARTTLS and AUTH, refuses the STARTTLS upgrade and
//! accepts everything else, recording each command it receives.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct Transcript {
    pub commands: Vec<String>,
    pub data: String,
}

impl Transcript {
    pub fn saw(&self, verb: &str) -> bool {
        self.commands
            .iter()
            .any(|command| command.to_ascii_uppercase().starts_with(verb))
    }

    pub fn recipients(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter(|command| command.to_ascii_uppercase().starts_with("RCPT TO:"))
            .map(|command| command.as_str())
            .collect()
    }
}

pub(crate) struct SmtpFixture {
    port: u16,
    handle: JoinHandle<Transcript>,
}

impl SmtpFixture {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind smtp fixture");
        let port = listener.local_addr().expect("fixture address").port();

        let handle = thread::spawn(move || {
            let mut transcript = Transcript::default();
            if let Ok((stream, _)) = listener.accept() {
                // Errors end the session; whatever was recorded so far is kept.
                let _ = serve(stream, &mut transcript);
            }
            transcript
        });

        SmtpFixture { port, handle }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn finish(self) -> Transcript {
        self.handle.join().expect("smtp fixture thread")
    }
}

fn serve(stream: TcpStream, transcript: &mut Transcript) -> io::Result<()> {
    stream.set_read_timeout(Some(Duration::from_secs(10)))?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    writer.write_all(b"220 fixture.local ESMTP ready\r\n")?;

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let command = line.trim_end().to_string();
        let verb = command
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();
        transcript.commands.push(command);

        let reply: &[u8] = match verb.as_str() {
            "EHLO" => b"250-fixture.local\r\n250-STARTTLS\r\n250 AUTH PLAIN LOGIN\r\n",
            "HELO" => b"250 fixture.local\r\n",
            "STARTTLS" => b"454 4.7.0 TLS not available\r\n",
            "AUTH" => b"235 2.7.0 Authentication successful\r\n",
            "MAIL" | "RCPT" | "RSET" | "NOOP" => b"250 2.0.0 OK\r\n",
            "DATA" => {
                writer.write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n")?;
                read_data(&mut reader, transcript)?;
                b"250 2.0.0 OK queued\r\n"
            }
            "QUIT" => {
                writer.write_all(b"221 2.0.0 Bye\r\n")?;
                return Ok(());
            }
            _ => b"502 5.5.2 Command not recognized\r\n",
        };
        writer.write_all(reply)?;
    }
}

fn read_data(reader: &mut impl BufRead, transcript: &mut Transcript) -> io::Result<()> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 || line == ".\r\n" {
            return Ok(());
        }
        transcript.data.push_str(&line);
    }
}
