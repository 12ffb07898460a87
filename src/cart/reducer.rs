use uuid::Uuid;

use super::state::{CartExtra, CartLine, CartState};
use crate::{
    models::MenuItem,
    pricing::{cart_total, line_total},
};

/// Every way the cart can change.
#[derive(Debug, Clone)]
pub enum CartCommand {
    Add {
        line_id: Uuid,
        menu_item: MenuItem,
        quantity: i32,
        selected_extras: Vec<CartExtra>,
    },
    Remove {
        line_id: Uuid,
    },
    SetQuantity {
        line_id: Uuid,
        quantity: i32,
    },
    Clear,
    /// Adopt a restored snapshot as-is, including its stored total.
    Load(CartState),
}

/// Pure transition: no ids are generated and nothing is persisted here.
pub fn reduce(state: CartState, command: CartCommand) -> CartState {
    match command {
        CartCommand::Add {
            line_id,
            menu_item,
            quantity,
            selected_extras,
        } => {
            let total_price = line_total(&menu_item, quantity, &selected_extras);
            let mut lines = state.lines;
            lines.push(CartLine {
                id: line_id,
                menu_item,
                quantity,
                selected_extras,
                total_price,
            });
            with_lines(lines)
        }
        CartCommand::Remove { line_id } => {
            let lines = state
                .lines
                .into_iter()
                .filter(|line| line.id != line_id)
                .collect();
            with_lines(lines)
        }
        CartCommand::SetQuantity { line_id, quantity } if quantity <= 0 => {
            reduce(state, CartCommand::Remove { line_id })
        }
        CartCommand::SetQuantity { line_id, quantity } => {
            let lines = state
                .lines
                .into_iter()
                .map(|mut line| {
                    if line.id == line_id {
                        line.quantity = quantity;
                        line.total_price =
                            line_total(&line.menu_item, quantity, &line.selected_extras);
                    }
                    line
                })
                .collect();
            with_lines(lines)
        }
        CartCommand::Clear => CartState::default(),
        CartCommand::Load(snapshot) => snapshot,
    }
}

fn with_lines(lines: Vec<CartLine>) -> CartState {
    let total = cart_total(&lines);
    CartState { lines, total }
}
