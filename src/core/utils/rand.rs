use rand::{Rng, distributions::Alphanumeric, thread_rng};

/// Random alphanumeric string of the given length; used for the localparts
/// of minted event and room ids and for token suffixes.
#[must_use]
pub fn random_string(length: usize) -> String {
	thread_rng()
		.sample_iter(Alphanumeric)
		.take(length)
		.map(char::from)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::random_string;

	#[test]
	fn expected_length_and_charset() {
		let s = random_string(16);
		assert_eq!(s.len(), 16);
		assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
	}
}
