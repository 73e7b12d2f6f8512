use std::io::{self, BufRead, Write};

use yt_keyword_downloader::{config::CliConfig, video::YtDlp};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let _ = dotenvy::dotenv();
    pretty_env_logger::init();

    let config = CliConfig::from_env();

    let (keyword, count) = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        let keyword = prompt_keyword(&mut input, &mut output)?;
        let count = prompt_count(&mut input, &mut output)?;
        (keyword, count)
    };

    tokio::fs::create_dir_all(&config.download_dir).await?;

    let ytdlp = YtDlp::new(&config.ytdlp_path);
    ytdlp
        .download_search(&keyword, count, &config.download_dir)
        .await?;

    Ok(())
}

fn read_trimmed<R: BufRead>(input: &mut R) -> io::Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input closed before a value was entered",
        ));
    }
    Ok(line.trim().to_string())
}

/// Ask until a non-empty keyword is given
fn prompt_keyword<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<String> {
    write!(output, "검색어를 입력하세요 (필수): ")?;
    output.flush()?;
    loop {
        let keyword = read_trimmed(input)?;
        if !keyword.is_empty() {
            return Ok(keyword);
        }
        write!(output, "검색어는 필수입니다. 검색어를 입력하세요: ")?;
        output.flush()?;
    }
}

/// Ask until a positive integer is given
fn prompt_count<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<u32> {
    loop {
        write!(output, "다운로드할 동영상 개수를 입력하세요 (필수): ")?;
        output.flush()?;
        match read_trimmed(input)?.parse::<u32>() {
            Ok(count) if count > 0 => return Ok(count),
            _ => writeln!(output, "유효한 정수를 입력해 주세요.")?,
        }
    }
}
