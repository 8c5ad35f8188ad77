// OpenLibrary Search - Book Search and Wishlist Core
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Search flow
//!
//! - `coordinator` - debounce, cancellation, cover filter, state emission
//! - `state` - the five search screen states and the update payload
//! - `toggle` - net-effect wishlist toggle used by the detail screen

pub mod coordinator;
pub mod state;
pub mod toggle;

pub use coordinator::SearchCoordinator;
pub use state::{SearchState, SearchUpdate};
pub use toggle::{ToggleOutcome, WishlistToggle};
