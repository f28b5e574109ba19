use tracing::warn;

use crate::llm::adapter::ChatAdapter;
use crate::llm::types::StreamEvent;

const DONE_MARKER: &str = "[DONE]";

/// 单行 SSE 的分类结果
#[derive(Debug, PartialEq, Eq)]
pub enum SseLine<'a> {
    /// 空行或非 `data:` 行
    Skip,
    /// `data: [DONE]` 或裸 `[DONE]`
    Done,
    Data(&'a str),
}

pub fn classify_line(line: &str) -> SseLine<'_> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return SseLine::Skip;
    }
    if trimmed == DONE_MARKER {
        return SseLine::Done;
    }

    let data = match line.strip_prefix("data:") {
        Some(rest) => rest.trim(),
        None => return SseLine::Skip,
    };

    if data == DONE_MARKER {
        SseLine::Done
    } else if data.is_empty() {
        SseLine::Skip
    } else {
        SseLine::Data(data)
    }
}

/// SSE (Server-Sent Events) 行解码器
///
/// 按字节缓冲分块到达的响应体，逐行交给厂商的 chunk 解析器：
///
/// ```text
/// data: {"choices":[{"delta":{"content":"Hel"}}]}
/// data: {"choices":[{"delta":{"content":"lo"}}]}
/// data: [DONE]
/// ```
///
/// 单行解析失败只记录日志并跳过，不会中断整个流；遇到 `[DONE]` 后忽略后续内容。
pub struct SseDecoder {
    buffer: Vec<u8>,
    finished: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// 追加一个数据块，返回其中完整行产生的事件
    pub fn feed(&mut self, adapter: &dyn ChatAdapter, data: &[u8]) -> Vec<StreamEvent> {
        if self.finished {
            return Vec::new();
        }
        self.buffer.extend_from_slice(data);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(event) = self.decode_line(adapter, &line) {
                events.push(event);
            }
            if self.finished {
                self.buffer.clear();
                break;
            }
        }
        events
    }

    /// 输入结束，处理缓冲区中没有换行结尾的最后一行
    pub fn finish(&mut self, adapter: &dyn ChatAdapter) -> Vec<StreamEvent> {
        let rest = std::mem::take(&mut self.buffer);
        let mut events = Vec::new();
        if !self.finished && !rest.is_empty() {
            let line = String::from_utf8_lossy(&rest);
            if let Some(event) = self.decode_line(adapter, &line) {
                events.push(event);
            }
        }
        self.finished = true;
        events
    }

    pub fn decode_line(&mut self, adapter: &dyn ChatAdapter, line: &str) -> Option<StreamEvent> {
        if self.finished {
            return None;
        }
        match classify_line(line) {
            SseLine::Skip => None,
            SseLine::Done => {
                self.finished = true;
                None
            }
            SseLine::Data(data) => match adapter.parse_stream_chunk(data) {
                Ok(event) => event,
                Err(err) => {
                    warn!(
                        provider = adapter.provider_name(),
                        error = %err,
                        "skipping malformed stream chunk"
                    );
                    None
                }
            },
        }
    }
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// 逐行解码并把事件同步推送给回调
pub fn decode_lines<'a, I>(
    adapter: &dyn ChatAdapter,
    lines: I,
    sink: &mut (dyn FnMut(StreamEvent) + Send),
) where
    I: IntoIterator<Item = &'a str>,
{
    let mut decoder = SseDecoder::new();
    for line in lines {
        if let Some(event) = decoder.decode_line(adapter, line) {
            sink(event);
        }
        if decoder.is_finished() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::OpenAiAdapter;

    fn collect(lines: &[&str]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        decode_lines(&OpenAiAdapter, lines.iter().copied(), &mut |event| events.push(event));
        events
    }

    #[test]
    fn test_classify_line() {
        assert_eq!(classify_line(""), SseLine::Skip);
        assert_eq!(classify_line("   "), SseLine::Skip);
        assert_eq!(classify_line(": keep-alive"), SseLine::Skip);
        assert_eq!(classify_line("event: message"), SseLine::Skip);
        assert_eq!(classify_line("data: [DONE]"), SseLine::Done);
        assert_eq!(classify_line("[DONE]"), SseLine::Done);
        assert_eq!(classify_line("data:{\"a\":1}\r\n"), SseLine::Data("{\"a\":1}"));
    }

    #[test]
    fn test_decode_openai_lines() {
        let events = collect(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}",
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}",
            "data: [DONE]",
            "data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}",
        ]);
        assert_eq!(
            events,
            vec![StreamEvent::Delta("Hel".into()), StreamEvent::Delta("lo".into())]
        );
    }

    #[test]
    fn test_malformed_line_is_skipped() {
        let events = collect(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}",
            "data: {not json",
            "data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}",
        ]);
        assert_eq!(
            events,
            vec![StreamEvent::Delta("a".into()), StreamEvent::Delta("b".into())]
        );
    }

    #[test]
    fn test_error_chunk_does_not_stop_stream() {
        let events = collect(&[
            "data: {\"error\":{\"message\":\"overloaded\"}}",
            "data: {\"choices\":[{\"delta\":{\"content\":\"still here\"}}]}",
        ]);
        assert_eq!(
            events,
            vec![
                StreamEvent::error("overloaded"),
                StreamEvent::Delta("still here".into())
            ]
        );
    }

    #[test]
    fn test_feed_buffers_partial_lines() {
        let mut decoder = SseDecoder::new();
        let first = decoder.feed(&OpenAiAdapter, b"data: {\"choices\":[{\"delta\":{\"con");
        assert!(first.is_empty());

        let second = decoder.feed(
            &OpenAiAdapter,
            "tent\":\"你好\"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"!\"}}]}".as_bytes(),
        );
        assert_eq!(second, vec![StreamEvent::Delta("你好".into())]);

        let rest = decoder.finish(&OpenAiAdapter);
        assert_eq!(rest, vec![StreamEvent::Delta("!".into())]);
        assert!(decoder.is_finished());
    }

    #[test]
    fn test_feed_keeps_split_multibyte_characters() {
        let line = "data: {\"choices\":[{\"delta\":{\"content\":\"流式\"}}]}\n".as_bytes();
        let split = line.len() - 8;
        let mut decoder = SseDecoder::new();
        let mut events = decoder.feed(&OpenAiAdapter, &line[..split]);
        events.extend(decoder.feed(&OpenAiAdapter, &line[split..]));
        assert_eq!(events, vec![StreamEvent::Delta("流式".into())]);
    }

    #[test]
    fn test_done_stops_feeding() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(
            &OpenAiAdapter,
            b"data: [DONE]\ndata: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\n",
        );
        assert!(events.is_empty());
        assert!(decoder.is_finished());
        assert!(decoder.finish(&OpenAiAdapter).is_empty());
    }
}
