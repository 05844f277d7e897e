//! 正規形 (USI 座標) と XBoard 方言の座標・局面の相互変換
//!
//! XBoard 方言では筋が `a`..`i`、段が `1`..`9` になる。変換表は
//! 英字 `a`..`i` と数字 `1`..`9` を1対1に対応させたもので、どちら向きにも同じ表を使う。
//! 駒打ちは正規形で `P*5e`、XBoard 方言で `P@e5`。
//!
//! 局面は XBoard 側から見ると 180 度回転し、先後 (英字の大小) が入れ替わる。

use crate::error::{EngineError, Result};

/// XBoard 方言の null move
pub const XBOARD_NULL_MOVE: &str = "@@@@";

/// 英字 ↔ 数字を入れ替える。表に無い文字は `None`。
#[inline]
fn swap_coordinate(c: char) -> Option<char> {
    match c {
        'a'..='i' => Some((b'1' + (c as u8 - b'a')) as char),
        '1'..='9' => Some((b'a' + (c as u8 - b'1')) as char),
        _ => None,
    }
}

fn translate(mv: &str, drop_from: char, drop_to: char) -> Option<String> {
    let chars: Vec<char> = mv.chars().collect();
    if chars.len() < 4 {
        return None;
    }
    let mut out = String::with_capacity(chars.len());
    if chars[1] == drop_from {
        out.push(chars[0]);
        out.push(drop_to);
    } else {
        out.push(swap_coordinate(chars[0])?);
        out.push(swap_coordinate(chars[1])?);
    }
    out.push(swap_coordinate(chars[2])?);
    out.push(swap_coordinate(chars[3])?);
    // 成りなどの末尾はそのまま
    out.extend(&chars[4..]);
    Some(out)
}

/// XBoard 方言の指し手を正規形に変換する。空文字列と null move は `None`。
pub fn decode_move(mv: &str) -> Result<Option<String>> {
    if mv.is_empty() || mv == XBOARD_NULL_MOVE {
        return Ok(None);
    }
    translate(mv, '@', '*').map(Some).ok_or_else(|| EngineError::MalformedMove(mv.to_string()))
}

/// 正規形の指し手を XBoard 方言に変換する。
pub fn encode_move(mv: &str) -> Result<String> {
    translate(mv, '*', '@').ok_or_else(|| EngineError::MalformedMove(mv.to_string()))
}

/// エンジンへ送る指し手コマンド。`usermove` 機能が有効なら接頭辞を付ける。
pub fn move_command(mv: &str, usermove: bool) -> Result<String> {
    let encoded = encode_move(mv)?;
    Ok(if usermove { format!("usermove {encoded}") } else { encoded })
}

/// 盤面の1段を升 (空き升の連続 / 成り駒を含む1駒) 単位に分ける。
fn split_squares(row: &str) -> Vec<&str> {
    let bytes = row.as_bytes();
    let mut squares = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        if bytes[i].is_ascii_digit() {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        } else {
            if bytes[i] == b'+' && i + 1 < bytes.len() {
                i += 1;
            }
            // 駒は ASCII 1 文字を想定。多バイト文字が来ても境界を崩さない
            i += row[i..].chars().next().map_or(1, char::len_utf8);
        }
        squares.push(&row[start..i]);
    }
    squares
}

/// SFEN の盤面部分を 180 度回転し、駒の先後を入れ替える。
///
/// 2回適用すると元に戻る。
pub fn rotate_board(board: &str) -> String {
    board
        .split('/')
        .rev()
        .map(|row| {
            split_squares(row)
                .into_iter()
                .rev()
                .flat_map(str::chars)
                .map(swap_case)
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[inline]
fn swap_case(c: char) -> char {
    if c.is_ascii_lowercase() {
        c.to_ascii_uppercase()
    } else if c.is_ascii_uppercase() {
        c.to_ascii_lowercase()
    } else {
        c
    }
}

/// 正規形の SFEN を `setboard` に渡す XBoard 側の局面に変換する。
/// 手番以降はそのまま残す。
pub fn to_xboard_position(sfen: &str) -> String {
    let mut parts = sfen.splitn(2, ' ');
    let board = parts.next().unwrap_or_default();
    match parts.next() {
        Some(rest) => format!("{} {}", rotate_board(board), rest),
        None => rotate_board(board),
    }
}

/// `setup` 応答の引数から正規形の開始局面を作る。
///
/// 盤面 (最初の `/` を含むトークン) を回転・先後反転し、手番を `b` に固定する。
/// 手番より後ろ (持ち駒・手数) はそのまま使い、無ければ `- 1` を補う。
pub fn from_xboard_setup(args: &str) -> Option<String> {
    let mut tokens = args.split_whitespace().skip_while(|tok| !tok.contains('/'));
    let board = tokens.next()?;
    let _side = tokens.next();
    let rest = tokens.collect::<Vec<_>>().join(" ");
    let rest = if rest.is_empty() { "- 1".to_string() } else { rest };
    Some(format!("{} b {}", rotate_board(board), rest))
}
