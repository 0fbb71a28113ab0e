use assistant_core::{SpeechError, SpeechToText, TextToSpeech};
use async_trait::async_trait;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin, Stdout,
};
use tokio::sync::Mutex;

/// Reads one utterance per line. A blank line counts as unintelligible input,
/// end of input closes the session.
pub struct ConsoleInput<R = BufReader<Stdin>> {
    lines: Mutex<Lines<R>>,
}

impl ConsoleInput {
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> ConsoleInput<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: Mutex::new(reader.lines()),
        }
    }
}

#[async_trait]
impl<R> SpeechToText for ConsoleInput<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn listen(&self) -> Result<String, SpeechError> {
        let mut lines = self.lines.lock().await;
        match lines.next_line().await? {
            None => Err(SpeechError::InputClosed),
            Some(line) if line.trim().is_empty() => Err(SpeechError::Unrecognized),
            Some(line) => Ok(line.trim().to_string()),
        }
    }
}

/// Prints answers instead of speaking them.
pub struct ConsoleOutput<W = Stdout> {
    writer: Mutex<W>,
}

impl ConsoleOutput {
    pub fn stdout() -> Self {
        Self::from_writer(tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin> ConsoleOutput<W> {
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W> TextToSpeech for ConsoleOutput<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let mut writer = self.writer.lock().await;
        writer.write_all(format!("{}\n", text).as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}
