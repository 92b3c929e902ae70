pub mod dispatch_passes;
