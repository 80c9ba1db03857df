//! 终端输入
//!
//! 人类玩家的走法来源：打印棋盘和合法走法列表，接受序号或 UCI 走法。

use std::io::{BufRead, Write};

use chess_ai::{ActionInput, SearchError};
use protocol::cozy_chess::{Color, File, Move, Piece, Rank, Square};
use protocol::{ChessPosition, GameState, Notation};

/// 终端输入
pub struct ConsoleInput<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> ConsoleInput<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// 解析一行输入：1 开始的序号，或 UCI 走法
    pub fn parse_line(position: &ChessPosition, legal: &[Move], line: &str) -> Option<Move> {
        let text = line.trim();
        if let Ok(index) = text.parse::<usize>() {
            return index.checked_sub(1).and_then(|i| legal.get(i)).copied();
        }
        position.parse_uci(text).ok()
    }

    fn show(&mut self, position: &ChessPosition, legal: &[Move]) -> std::io::Result<()> {
        writeln!(self.writer)?;
        write!(self.writer, "{}", render_board(position))?;
        writeln!(self.writer, "{} to move", position.side_to_move())?;
        for (i, mv) in legal.iter().enumerate() {
            let san = Notation::to_san(position, *mv).unwrap_or_else(|_| mv.to_string());
            write!(self.writer, "{:>3}. {:<8}", i + 1, san)?;
            if (i + 1) % 6 == 0 {
                writeln!(self.writer)?;
            }
        }
        writeln!(self.writer)?;
        Ok(())
    }
}

fn io_error(e: std::io::Error) -> SearchError {
    SearchError::Input(e.to_string())
}

impl<R: BufRead, W: Write> ActionInput<ChessPosition> for ConsoleInput<R, W> {
    fn read_action(
        &mut self,
        state: &ChessPosition,
        legal: &[Move],
    ) -> Result<Option<Move>, SearchError> {
        self.show(state, legal).map_err(io_error)?;

        loop {
            write!(self.writer, "move> ").map_err(io_error)?;
            self.writer.flush().map_err(io_error)?;

            let mut line = String::new();
            let read = self.reader.read_line(&mut line).map_err(io_error)?;
            if read == 0 {
                return Ok(None);
            }

            let text = line.trim();
            match text {
                "" => continue,
                "quit" | "resign" => return Ok(None),
                _ => {}
            }

            match Self::parse_line(state, legal, text) {
                Some(mv) => return Ok(Some(mv)),
                None => {
                    writeln!(self.writer, "Not a legal move: {}", text).map_err(io_error)?;
                }
            }
        }
    }
}

/// 文本棋盘，白方在下
pub fn render_board(position: &ChessPosition) -> String {
    let board = position.board();
    let mut output = String::new();
    for &rank in Rank::ALL.iter().rev() {
        output.push(protocol::rank_char(rank));
        output.push(' ');
        for &file in File::ALL.iter() {
            let square = Square::new(file, rank);
            let symbol = match (board.piece_on(square), board.color_on(square)) {
                (Some(piece), Some(color)) => piece_symbol(piece, color),
                _ => '.',
            };
            output.push(symbol);
            output.push(' ');
        }
        output.pop();
        output.push('\n');
    }
    output.push_str("  a b c d e f g h\n");
    output
}

fn piece_symbol(piece: Piece, color: Color) -> char {
    let symbol = match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    };
    match color {
        Color::White => symbol.to_ascii_uppercase(),
        Color::Black => symbol,
    }
}
