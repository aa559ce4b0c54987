//! Dumps the games and moves tables

use chess_referee_core::Database;

fn main() {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CHESS_DB_PATH").ok())
        .unwrap_or_else(|| "chess.db".to_string());

    let db = match Database::open(&path) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to open {}: {}", path, e);
            std::process::exit(1);
        }
    };

    let games = match db.get_all_games() {
        Ok(games) => games,
        Err(e) => {
            eprintln!("Failed to read games: {}", e);
            std::process::exit(1);
        }
    };

    println!("GAMES ({})", games.len());
    for game in &games {
        println!(
            "  #{} [{}] winner={} created_at={}",
            game.id,
            game.status,
            game.winner.as_deref().unwrap_or("-"),
            game.created_at
        );
        println!("    {}", game.fen);
    }

    match db.get_all_moves() {
        Ok(moves) => {
            println!("\nMOVES ({})", moves.len());
            for mv in &moves {
                println!(
                    "  game {} #{} {} {}{} at {}",
                    mv.game_id, mv.move_no, mv.player, mv.from_sq, mv.to_sq, mv.timestamp
                );
            }
        }
        Err(e) => {
            eprintln!("Failed to read moves: {}", e);
            std::process::exit(1);
        }
    }
}
