// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// All Burn model and training code lives here. The data layer
// only touches Burn through its Dataset and Batcher traits.
//
//   model.rs   - The CNN-LSTM network
//                Compiles a domain Topology into a Burn Config,
//                then builds:
//                  • per-block Conv1d + ReLU stack (shared weights)
//                  • per-block dropout and max pooling
//                  • LSTM over the block sequence (final state)
//                  • dropout + dense head producing class logits;
//                    softmax is folded into the loss
//
//   trainer.rs - The training loop
//                Forward pass, categorical cross-entropy,
//                backward pass, Adam step, and test-set
//                evaluation with dropout disabled
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// CNN-LSTM model architecture
pub mod model;

/// Training loop and evaluation
pub mod trainer;
