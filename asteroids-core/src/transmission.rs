//! Post-clear "incoming transmission" cutscene.
//!
//! The sequence is a fixed chain of timed states. Each state holds until its
//! accumulated tick count reaches the state's duration, then hands over to the
//! next one with a fresh clock. Visible effects are derived on demand from
//! `(state, current_time)` through [`Transmission::frame`].

use core::f32::consts::{FRAC_PI_2, PI};

use serde::Serialize;

use crate::config::GameConfig;
use crate::constants::{
    MESSAGE_TYPING_DIVISOR, START_WAIT_TICKS, STATIC_BOX_TICKS, STATIC_LINE_SEPARATION,
    STATIC_POOL_FACTOR, TRANS_BOX_TICKS, TRANS_LABEL_TICKS, TYPING_INTERVAL, WAIT1_TICKS,
};
use crate::geometry::Vec2;
use crate::rng::SeededRng;

const LABEL_X_RATIO: f32 = 0.05;
const LABEL_Y_RATIO: f32 = 0.025;
const TRANS_BOX_WIDTH_RATIO: f32 = 0.9;
const TRANS_BOX_HEIGHT_RATIO: f32 = 0.1;
const STATIC_BOX_WIDTH_RATIO: f32 = 0.15;
const STATIC_BOX_HEIGHT_RATIO: f32 = 0.25;
const LABEL_CLEARANCE: f32 = 0.3;
const STATIC_LABEL_SPACING: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TransmissionState {
    StartWait,
    TransLabel,
    TransBox,
    Wait1,
    StaticBox,
    StaticLabel,
    TransMessage,
    Finished,
}

impl TransmissionState {
    pub const ALL: [Self; 8] = [
        Self::StartWait,
        Self::TransLabel,
        Self::TransBox,
        Self::Wait1,
        Self::StaticBox,
        Self::StaticLabel,
        Self::TransMessage,
        Self::Finished,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }
}

/// Per-state durations in ticks.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TransmissionTimeline {
    durations: [f32; 8],
}

impl TransmissionTimeline {
    pub fn for_texts(static_label: &str, message: &str) -> Self {
        let static_label_ticks = (static_label.chars().count() as f32 * TYPING_INTERVAL).ceil();
        let message_ticks = (message.chars().count() as f32 * TYPING_INTERVAL
            / MESSAGE_TYPING_DIVISOR)
            .ceil();
        Self {
            durations: [
                START_WAIT_TICKS,
                TRANS_LABEL_TICKS,
                TRANS_BOX_TICKS,
                WAIT1_TICKS,
                STATIC_BOX_TICKS,
                static_label_ticks,
                message_ticks,
                0.0,
            ],
        }
    }

    pub fn duration(&self, state: TransmissionState) -> f32 {
        self.durations[state.index()]
    }

    pub fn total(&self) -> f32 {
        self.durations.iter().sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rect {
    pub left: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn top(&self) -> f32 {
        self.bottom + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.left + self.width / 2.0, self.bottom + self.height / 2.0)
    }

    /// Same centre, new size.
    pub fn resized(&self, width: f32, height: f32) -> Self {
        let center = self.center();
        Self {
            left: center.x - width / 2.0,
            bottom: center.y - height / 2.0,
            width,
            height,
        }
    }

    /// Corners in counter-clockwise order starting bottom-left.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.left, self.bottom),
            Vec2::new(self.right(), self.bottom),
            Vec2::new(self.right(), self.top()),
            Vec2::new(self.left, self.top()),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WrappedText {
    /// Source text with some spaces swapped for line breaks; same character count.
    pub text: String,
    pub char_size: f32,
    pub line_count: usize,
}

/// Breaks `text` at spaces so no line is wider than `max_width`. When the lines do not fit the
/// box, the glyphs shrink to `base_char_size / n` for the smallest `n` whose wrap has at most
/// `n` lines.
pub fn wrap_text(text: &str, max_width: f32, base_char_size: f32, advance: f32) -> WrappedText {
    let word_count = text.split(' ').count().max(1);
    let mut allowed_lines = 1;
    loop {
        let char_size = base_char_size / allowed_lines as f32;
        let lines = greedy_lines(text, max_width, char_size * advance);
        if lines.len() <= allowed_lines || allowed_lines >= word_count {
            return WrappedText {
                line_count: lines.len(),
                text: lines.join("\n"),
                char_size,
            };
        }
        allowed_lines += 1;
    }
}

fn greedy_lines(text: &str, max_width: f32, glyph_width: f32) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split(' ') {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate_chars = current.chars().count() + 1 + word.chars().count();
        if candidate_chars as f32 * glyph_width > max_width {
            lines.push(core::mem::take(&mut current));
            current.push_str(word);
        } else {
            current.push(' ');
            current.push_str(word);
        }
    }
    lines.push(current);
    lines
}

/// Fixed world-space placement of every cutscene element.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransmissionLayout {
    pub label_start: Vec2,
    pub label_end: Vec2,
    pub label_char_size: f32,
    pub trans_box: Rect,
    pub static_box: Rect,
    pub static_label_origin: Vec2,
    /// Upper-left anchor of the message block.
    pub message_origin: Vec2,
    pub message: WrappedText,
}

impl TransmissionLayout {
    pub fn new(config: &GameConfig) -> Self {
        let bounds = config.bounds();
        let (width, height) = (config.x_width, config.y_height);

        let label_end = Vec2::new(
            bounds.x_min + width * LABEL_X_RATIO,
            bounds.y_min + height * LABEL_Y_RATIO,
        );
        let label_start = label_end - Vec2::new(0.0, height / 2.0);

        let trans_box = Rect {
            left: bounds.x_min + width * (1.0 - TRANS_BOX_WIDTH_RATIO) / 2.0,
            bottom: label_end.y + config.label_char_size * LABEL_CLEARANCE,
            width: width * TRANS_BOX_WIDTH_RATIO,
            height: height * TRANS_BOX_HEIGHT_RATIO,
        };

        let static_box = Rect {
            left: trans_box.left - width * (1.0 - TRANS_BOX_WIDTH_RATIO) / 3.0,
            bottom: trans_box.bottom + height * TRANS_BOX_HEIGHT_RATIO / 5.0,
            width: width * STATIC_BOX_WIDTH_RATIO,
            height: height * STATIC_BOX_HEIGHT_RATIO,
        };

        let spacing = config.label_char_size * STATIC_LABEL_SPACING;
        let static_label_origin =
            Vec2::new(static_box.right() + spacing, trans_box.top() + spacing * 2.0);

        let message_origin = Vec2::new(static_box.right(), trans_box.top());
        let message = wrap_text(
            &config.message,
            trans_box.right() - message_origin.x,
            trans_box.height,
            config.glyph_advance,
        );

        Self {
            label_start,
            label_end,
            label_char_size: config.label_char_size,
            trans_box,
            static_box,
            static_label_origin,
            message_origin,
            message,
        }
    }
}

/// What the cutscene shows at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TransmissionFrame {
    pub state: TransmissionState,
    pub label_position: Vec2,
    pub trans_box: Option<Rect>,
    pub static_box: Option<Rect>,
    pub static_label_chars: usize,
    pub message_chars: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransmissionStep {
    Holding,
    Advanced(TransmissionState),
    Completed,
}

#[derive(Clone, Debug)]
pub struct Transmission {
    state: TransmissionState,
    current_time: f32,
    completed: bool,
    timeline: TransmissionTimeline,
    layout: TransmissionLayout,
    label: String,
    static_label: String,
    static_pool: Vec<bool>,
}

impl Transmission {
    pub fn new(config: &GameConfig, rng: &mut SeededRng) -> Self {
        let layout = TransmissionLayout::new(config);
        let timeline = TransmissionTimeline::for_texts(&config.static_label, &layout.message.text);
        let pool_len =
            (STATIC_POOL_FACTOR * layout.static_box.height / STATIC_LINE_SEPARATION).floor()
                as usize;
        let static_pool = (0..pool_len).map(|_| rng.coin_flip()).collect();

        Self {
            state: TransmissionState::StartWait,
            current_time: 0.0,
            completed: false,
            timeline,
            layout,
            label: config.transmission_label.clone(),
            static_label: config.static_label.clone(),
            static_pool,
        }
    }

    pub fn state(&self) -> TransmissionState {
        self.state
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    /// True once the final state has been reached.
    pub fn is_finished(&self) -> bool {
        self.state == TransmissionState::Finished
    }

    /// True once the final state has also run out; the outer game is over.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn timeline(&self) -> &TransmissionTimeline {
        &self.timeline
    }

    pub fn layout(&self) -> &TransmissionLayout {
        &self.layout
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn static_label(&self) -> &str {
        &self.static_label
    }

    pub fn message(&self) -> &str {
        &self.layout.message.text
    }

    pub fn static_pool(&self) -> &[bool] {
        &self.static_pool
    }

    pub fn advance(&mut self, dt_ticks: f32) -> TransmissionStep {
        if self.completed {
            return TransmissionStep::Completed;
        }

        self.current_time += dt_ticks;
        let duration = self.timeline.duration(self.state);
        if self.current_time < duration {
            return TransmissionStep::Holding;
        }

        match self.state.next() {
            Some(next) => {
                self.state = next;
                self.current_time = 0.0;
                TransmissionStep::Advanced(next)
            }
            None => {
                self.current_time = duration;
                self.completed = true;
                TransmissionStep::Completed
            }
        }
    }

    fn normalized_time(&self) -> f32 {
        let duration = self.timeline.duration(self.state);
        if duration > 0.0 {
            (self.current_time / duration).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    pub fn frame(&self) -> TransmissionFrame {
        use TransmissionState as S;

        let stage = self.state.index();
        let t = self.normalized_time();
        let layout = &self.layout;

        let label_position = match self.state {
            S::StartWait => layout.label_start,
            S::TransLabel => layout
                .label_start
                .lerp(layout.label_end, (t * FRAC_PI_2).sin()),
            _ => layout.label_end,
        };

        let trans_box = if stage < S::TransBox.index() {
            None
        } else if self.state == S::TransBox {
            Some(
                layout
                    .trans_box
                    .resized(layout.trans_box.width * t, layout.trans_box.height),
            )
        } else {
            Some(layout.trans_box)
        };

        let static_box = if stage < S::StaticBox.index() {
            None
        } else if self.state == S::StaticBox {
            let width = layout.static_box.width * ((FRAC_PI_2 + t * 2.0 * PI).sin() + 1.0) / 2.0;
            let height =
                layout.static_box.height * ((3.0 * FRAC_PI_2 + t * 3.0 * PI).sin() + 1.0) / 2.0;
            Some(layout.static_box.resized(width, height))
        } else {
            Some(layout.static_box)
        };

        let static_label_len = self.static_label.chars().count();
        let static_label_chars = if stage < S::StaticLabel.index() {
            0
        } else if self.state == S::StaticLabel {
            typed_chars(self.current_time, TYPING_INTERVAL, static_label_len)
        } else {
            static_label_len
        };

        let message_len = self.layout.message.text.chars().count();
        let message_chars = if stage < S::TransMessage.index() {
            0
        } else if self.state == S::TransMessage {
            typed_chars(
                self.current_time,
                TYPING_INTERVAL / MESSAGE_TYPING_DIVISOR,
                message_len,
            )
        } else {
            message_len
        };

        TransmissionFrame {
            state: self.state,
            label_position,
            trans_box,
            static_box,
            static_label_chars,
            message_chars,
        }
    }
}

/// One character appears every `interval` ticks, the first one immediately after entry.
fn typed_chars(time: f32, interval: f32, len: usize) -> usize {
    ((time / interval).ceil().max(0.0) as usize).min(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transmission() -> Transmission {
        let mut rng = SeededRng::new(0xDEAD_BEEF);
        Transmission::new(&GameConfig::default(), &mut rng)
    }

    #[test]
    fn timeline_derives_text_driven_durations() {
        let timeline = TransmissionTimeline::for_texts("?????", "abcdefghij");
        assert_eq!(timeline.duration(TransmissionState::StaticLabel), 100.0);
        assert_eq!(timeline.duration(TransmissionState::TransMessage), 40.0);
        assert_eq!(timeline.duration(TransmissionState::Finished), 0.0);
        assert_eq!(timeline.total(), 50.0 + 35.0 + 25.0 + 15.0 + 20.0 + 100.0 + 40.0);
    }

    #[test]
    fn reaching_finished_takes_the_sum_of_all_durations() {
        let mut transmission = transmission();
        let total = transmission.timeline().total() as u32;

        let mut ticks = 0u32;
        while !transmission.is_finished() {
            let before = transmission.state();
            let duration = transmission.timeline().duration(before);
            transmission.advance(1.0);
            ticks += 1;
            assert!(
                transmission.current_time()
                    <= transmission.timeline().duration(transmission.state()),
                "time overran {:?}",
                transmission.state()
            );
            assert!(transmission.current_time() <= duration.max(1.0));
            assert!(ticks <= total + 1, "sequence never finished");
        }
        assert_eq!(ticks, total);
        assert!(!transmission.is_completed());

        assert_eq!(transmission.advance(1.0), TransmissionStep::Completed);
        assert!(transmission.is_completed());
        assert_eq!(transmission.advance(1.0), TransmissionStep::Completed);
        assert_eq!(transmission.state(), TransmissionState::Finished);
    }

    #[test]
    fn states_advance_in_order() {
        let mut transmission = transmission();
        let mut seen = vec![transmission.state()];
        for _ in 0..10_000 {
            if let TransmissionStep::Advanced(next) = transmission.advance(1.0) {
                seen.push(next);
            }
            if transmission.is_finished() {
                break;
            }
        }
        assert_eq!(seen, TransmissionState::ALL.to_vec());
    }

    #[test]
    fn label_eases_from_start_to_end() {
        let mut transmission = transmission();
        let layout = transmission.layout().clone();
        assert_eq!(transmission.frame().label_position, layout.label_start);

        for _ in 0..50 {
            transmission.advance(1.0);
        }
        assert_eq!(transmission.state(), TransmissionState::TransLabel);
        assert_eq!(transmission.frame().label_position, layout.label_start);

        let mut last_y = layout.label_start.y;
        for _ in 0..34 {
            transmission.advance(1.0);
            let y = transmission.frame().label_position.y;
            assert!(y >= last_y);
            last_y = y;
        }
        transmission.advance(1.0);
        assert_eq!(transmission.state(), TransmissionState::TransBox);
        assert_eq!(transmission.frame().label_position, layout.label_end);
    }

    #[test]
    fn boxes_grow_then_lock_to_target() {
        let mut transmission = transmission();
        let layout = transmission.layout().clone();
        while transmission.state() != TransmissionState::TransBox {
            transmission.advance(1.0);
        }
        assert!(transmission.frame().static_box.is_none());
        let opening = transmission.frame().trans_box.expect("box visible");
        assert_eq!(opening.width, 0.0);

        for _ in 0..10 {
            transmission.advance(1.0);
        }
        let growing = transmission.frame().trans_box.expect("box visible");
        assert!((growing.width - layout.trans_box.width * 10.0 / 25.0).abs() < 1e-5);
        assert!((growing.center().x - layout.trans_box.center().x).abs() < 1e-5);

        while transmission.state() != TransmissionState::StaticBox {
            transmission.advance(1.0);
        }
        let first = transmission.frame().static_box.expect("static box visible");
        assert!((first.width - layout.static_box.width).abs() < 1e-5);
        assert!(first.height.abs() < 1e-5);

        while transmission.state() == TransmissionState::StaticBox {
            transmission.advance(1.0);
        }
        assert_eq!(transmission.frame().static_box, Some(layout.static_box));
        assert_eq!(transmission.frame().trans_box, Some(layout.trans_box));
    }

    #[test]
    fn text_types_one_character_per_interval() {
        let mut transmission = transmission();
        while transmission.state() != TransmissionState::StaticLabel {
            transmission.advance(1.0);
        }
        assert_eq!(transmission.frame().static_label_chars, 0);
        transmission.advance(1.0);
        assert_eq!(transmission.frame().static_label_chars, 1);
        for _ in 0..20 {
            transmission.advance(1.0);
        }
        assert_eq!(transmission.frame().static_label_chars, 2);
        assert_eq!(transmission.frame().message_chars, 0);

        while transmission.state() != TransmissionState::TransMessage {
            transmission.advance(1.0);
        }
        assert_eq!(transmission.frame().static_label_chars, 5);
        for _ in 0..8 {
            transmission.advance(1.0);
        }
        assert_eq!(transmission.frame().message_chars, 2);
    }

    #[test]
    fn wrapping_keeps_character_count_and_fits_width() {
        let text = "one two three four five six seven eight nine ten";
        let wrapped = wrap_text(text, 0.5, 0.1, 0.6);
        assert_eq!(wrapped.text.chars().count(), text.chars().count());
        assert!(wrapped.line_count > 1);
        assert_eq!(wrapped.text.replace('\n', " "), text);
        for line in wrapped.text.lines() {
            let width = line.chars().count() as f32 * wrapped.char_size * 0.6;
            assert!(width <= 0.5 + 1e-5 || !line.contains(' '), "line too wide: {line}");
        }
        assert!(wrapped.line_count as f32 <= 0.1 / wrapped.char_size + 1e-3);
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let wrapped = wrap_text("hello", 1.0, 0.1, 0.6);
        assert_eq!(wrapped.line_count, 1);
        assert_eq!(wrapped.char_size, 0.1);
        assert_eq!(wrapped.text, "hello");
    }

    #[test]
    fn static_pool_size_follows_box_height() {
        let transmission = transmission();
        let expected = (STATIC_POOL_FACTOR * transmission.layout().static_box.height
            / STATIC_LINE_SEPARATION)
            .floor() as usize;
        assert_eq!(transmission.static_pool().len(), expected);
        assert!(transmission.static_pool().iter().any(|bit| *bit));
        assert!(transmission.static_pool().iter().any(|bit| !*bit));
    }
}
