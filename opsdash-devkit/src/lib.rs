/*!
# opsdash DevKit - Stubs and Utilities for Development

Support library for developing and testing against the master's wire
contract without a real master:
- In-process mock master (HTTP envelope endpoints + WebSocket push hub)
- Recording notifier for asserting on user-visible notices
- Push frame builders matching the channel protocol
- Polling helpers for async assertions
*/

pub mod frames;
pub mod mock_master;
pub mod notices;
pub mod wait;

pub use mock_master::MockMaster;
pub use notices::RecordingNotifier;
pub use wait::wait_for;
